//! Raw triplet records as they appear in the JSON input files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CakeError, Result};

/// Relation prefix marking a synthesized backward triplet.
pub const INVERSE_PREFIX: &str = "inverse ";

/// One `{head_id, relation, tail_id}` object from an input file.
///
/// Unknown keys are ignored. `head` and `tail` are optional surface names some
/// dumps carry alongside the ids; they travel with their ids through reversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    /// Required, but may be `""` for placeholder examples
    pub head_id: String,
    pub relation: String,
    pub tail_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
}

impl Triplet {
    pub fn new(
        head_id: impl Into<String>,
        relation: impl Into<String>,
        tail_id: impl Into<String>,
    ) -> Self {
        Self {
            head_id: head_id.into(),
            relation: relation.into(),
            tail_id: tail_id.into(),
            head: None,
            tail: None,
        }
    }
}

/// Swap head and tail and toggle the `inverse ` relation prefix.
///
/// Applying it twice returns the original triplet.
pub fn reverse_triplet(triplet: &Triplet) -> Triplet {
    Triplet {
        head_id: triplet.tail_id.clone(),
        relation: inverse_relation(&triplet.relation),
        tail_id: triplet.head_id.clone(),
        head: triplet.tail.clone(),
        tail: triplet.head.clone(),
    }
}

/// `r` -> `inverse r`, `inverse r` -> `r`.
pub fn inverse_relation(relation: &str) -> String {
    match relation.strip_prefix(INVERSE_PREFIX) {
        Some(base) => base.to_string(),
        None => format!("{}{}", INVERSE_PREFIX, relation),
    }
}

/// Base relation of an inverse relation, or None for a forward one.
pub fn base_relation(relation: &str) -> Option<&str> {
    relation.strip_prefix(INVERSE_PREFIX)
}

/// Fail unless `path` names a `.json` file.
pub fn ensure_json(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(()),
        _ => Err(CakeError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read a JSON array of triplet objects.
pub fn read_triplets(path: impl AsRef<Path>) -> Result<Vec<Triplet>> {
    let path = path.as_ref();
    ensure_json(path)?;
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Split a comma-separated path list the way training scripts pass them.
pub fn split_paths(paths: &str) -> Vec<&str> {
    paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reverse_is_involution() {
        let mut t = Triplet::new("e1", "born_in", "e2");
        t.head = Some("Alice".into());

        let back = reverse_triplet(&t);
        assert_eq!(back.head_id, "e2");
        assert_eq!(back.tail_id, "e1");
        assert_eq!(back.relation, "inverse born_in");
        assert_eq!(back.tail.as_deref(), Some("Alice"));

        assert_eq!(reverse_triplet(&back), t);
    }

    #[test]
    fn test_base_relation() {
        assert_eq!(base_relation("inverse r1"), Some("r1"));
        assert_eq!(base_relation("r1"), None);
        assert_eq!(inverse_relation("r1"), "inverse r1");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let raw = r#"[{"head_id": "e1", "relation": "r", "tail_id": "e2", "weight": 3}]"#;
        let triplets: Vec<Triplet> = serde_json::from_str(raw).unwrap();
        assert_eq!(triplets, vec![Triplet::new("e1", "r", "e2")]);
    }

    #[test]
    fn test_identifiers_required() {
        let missing_head = r#"[{"relation": "r", "tail_id": "e2"}]"#;
        assert!(serde_json::from_str::<Vec<Triplet>>(missing_head).is_err());

        let placeholder = r#"[{"head_id": "", "relation": "r", "tail_id": "e2"}]"#;
        let triplets: Vec<Triplet> = serde_json::from_str(placeholder).unwrap();
        assert_eq!(triplets[0].head_id, "");
    }

    #[test]
    fn test_read_rejects_non_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "e1\tr\te2").unwrap();

        assert!(matches!(
            read_triplets(&path),
            Err(CakeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_split_paths() {
        assert_eq!(split_paths("a.json, b.json,"), vec!["a.json", "b.json"]);
    }
}
