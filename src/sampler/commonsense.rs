//! Commonsense tables: entity domains and relation domain constraints.
//!
//! Each relation has a set of domains its heads belong to and a set its tails
//! belong to, plus a cardinality class. The tables are loaded once and never
//! change during a run.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::{CakeError, Result};

pub const ENT_DOM_FILE: &str = "ent_dom.json";
pub const DOM_ENT_FILE: &str = "dom_ent.json";
pub const REL2DOM_H_FILE: &str = "rel2dom_h.json";
pub const REL2DOM_T_FILE: &str = "rel2dom_t.json";
pub const REL2NN_FILE: &str = "rel2nn.json";

/// Domain (concept) id. JSON numbers and strings both normalize to the decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(String);

impl DomainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DomainId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => DomainId(n.to_string()),
            Raw::Str(s) => DomainId(s),
        })
    }
}

/// A single domain or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(DomainId),
    Many(Vec<DomainId>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<DomainId> {
        match self {
            OneOrMany::One(d) => vec![d],
            OneOrMany::Many(ds) => ds,
        }
    }
}

/// Relation cardinality class as coded in `rel2nn.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationComplexity {
    /// 0
    OneToOne,
    /// 1
    OneToMany,
    /// 2
    ManyToOne,
    /// 3
    ManyToMany,
}

impl RelationComplexity {
    pub fn code(self) -> u8 {
        match self {
            RelationComplexity::OneToOne => 0,
            RelationComplexity::OneToMany => 1,
            RelationComplexity::ManyToOne => 2,
            RelationComplexity::ManyToMany => 3,
        }
    }

    /// Class of the relation read backwards: 1-N and N-1 swap.
    pub fn inverse(self) -> Self {
        match self {
            RelationComplexity::OneToMany => RelationComplexity::ManyToOne,
            RelationComplexity::ManyToOne => RelationComplexity::OneToMany,
            other => other,
        }
    }
}

impl TryFrom<u8> for RelationComplexity {
    type Error = CakeError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(RelationComplexity::OneToOne),
            1 => Ok(RelationComplexity::OneToMany),
            2 => Ok(RelationComplexity::ManyToOne),
            3 => Ok(RelationComplexity::ManyToMany),
            other => Err(CakeError::InvalidComplexity(other)),
        }
    }
}

impl fmt::Display for RelationComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationComplexity::OneToOne => "1-1",
            RelationComplexity::OneToMany => "1-N",
            RelationComplexity::ManyToOne => "N-1",
            RelationComplexity::ManyToMany => "N-N",
        };
        f.write_str(s)
    }
}

/// The five read-only commonsense lookups.
#[derive(Debug, Clone, Default)]
pub struct CommonsenseTables {
    ent_dom: FxHashMap<String, Vec<DomainId>>,
    dom_ent: FxHashMap<String, Vec<String>>,
    rel2dom_h: FxHashMap<String, Vec<DomainId>>,
    rel2dom_t: FxHashMap<String, Vec<DomainId>>,
    rel2nn: FxHashMap<String, RelationComplexity>,
}

impl CommonsenseTables {
    /// Load `ent_dom.json`, `dom_ent.json`, `rel2dom_h.json`, `rel2dom_t.json`
    /// and `rel2nn.json` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let ent_dom: FxHashMap<String, OneOrMany> = read_json(&dir.join(ENT_DOM_FILE))?;
        let dom_ent: FxHashMap<String, Vec<String>> = read_json(&dir.join(DOM_ENT_FILE))?;
        let rel2dom_h: FxHashMap<String, Vec<DomainId>> = read_json(&dir.join(REL2DOM_H_FILE))?;
        let rel2dom_t: FxHashMap<String, Vec<DomainId>> = read_json(&dir.join(REL2DOM_T_FILE))?;
        let raw_rel2nn: FxHashMap<String, u8> = read_json(&dir.join(REL2NN_FILE))?;

        let rel2nn: FxHashMap<String, RelationComplexity> = raw_rel2nn
            .into_iter()
            .map(|(rel, code)| Ok((rel, RelationComplexity::try_from(code)?)))
            .collect::<Result<_>>()?;

        let tables = Self {
            ent_dom: ent_dom.into_iter().map(|(e, d)| (e, d.into_vec())).collect(),
            dom_ent,
            rel2dom_h,
            rel2dom_t,
            rel2nn,
        };
        info!(
            entities = tables.ent_dom.len(),
            domains = tables.dom_ent.len(),
            relations = tables.rel2nn.len(),
            dir = %dir.display(),
            "Loaded commonsense tables"
        );
        Ok(tables)
    }

    /// Domains `entity_id` belongs to.
    pub fn domains_of(&self, entity_id: &str) -> Option<&[DomainId]> {
        self.ent_dom.get(entity_id).map(Vec::as_slice)
    }

    /// Entities in `domain`, in file order.
    pub fn entities_in(&self, domain: &DomainId) -> Result<&[String]> {
        self.dom_ent
            .get(domain.as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| CakeError::UnknownDomain(domain.to_string()))
    }

    /// Domains heads of `relation` belong to.
    pub fn head_domains(&self, relation: &str) -> Result<&[DomainId]> {
        self.rel2dom_h
            .get(relation)
            .map(Vec::as_slice)
            .ok_or_else(|| CakeError::UnknownRelation(relation.to_string()))
    }

    /// Domains tails of `relation` belong to.
    pub fn tail_domains(&self, relation: &str) -> Result<&[DomainId]> {
        self.rel2dom_t
            .get(relation)
            .map(Vec::as_slice)
            .ok_or_else(|| CakeError::UnknownRelation(relation.to_string()))
    }

    pub fn complexity(&self, relation: &str) -> Result<RelationComplexity> {
        self.rel2nn
            .get(relation)
            .copied()
            .ok_or_else(|| CakeError::UnknownRelation(relation.to_string()))
    }

    pub fn num_relations(&self) -> usize {
        self.rel2nn.len()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_inverse_is_involution() {
        for code in 0..4u8 {
            let c = RelationComplexity::try_from(code).unwrap();
            assert_eq!(c.code(), code);
            assert_eq!(c.inverse().inverse(), c);
        }
        assert_eq!(
            RelationComplexity::OneToMany.inverse(),
            RelationComplexity::ManyToOne
        );
        assert_eq!(
            RelationComplexity::ManyToMany.inverse(),
            RelationComplexity::ManyToMany
        );
        assert!(matches!(
            RelationComplexity::try_from(4),
            Err(CakeError::InvalidComplexity(4))
        ));
    }

    #[test]
    fn test_domain_ids_normalize() {
        let ids: Vec<DomainId> = serde_json::from_str(r#"[3, "7", "person"]"#).unwrap();
        assert_eq!(
            ids,
            vec![DomainId::new("3"), DomainId::new("7"), DomainId::new("person")]
        );
    }

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            (ENT_DOM_FILE, r#"{"e1": 0, "e2": [0, 1]}"#),
            (DOM_ENT_FILE, r#"{"0": ["e1", "e2"], "1": ["e2"]}"#),
            (REL2DOM_H_FILE, r#"{"r1": [0]}"#),
            (REL2DOM_T_FILE, r#"{"r1": [1]}"#),
            (REL2NN_FILE, r#"{"r1": 2}"#),
        ];
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }

        let tables = CommonsenseTables::load(dir.path()).unwrap();
        assert_eq!(tables.domains_of("e2").unwrap().len(), 2);
        assert_eq!(tables.domains_of("e1").unwrap(), &[DomainId::new("0")]);
        assert_eq!(tables.tail_domains("r1").unwrap(), &[DomainId::new("1")]);
        assert_eq!(
            tables.entities_in(&DomainId::new("1")).unwrap(),
            &["e2".to_string()]
        );
        assert_eq!(
            tables.complexity("r1").unwrap(),
            RelationComplexity::ManyToOne
        );
        assert!(matches!(
            tables.head_domains("r9"),
            Err(CakeError::UnknownRelation(_))
        ));
        assert!(matches!(
            tables.entities_in(&DomainId::new("5")),
            Err(CakeError::UnknownDomain(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_class() {
        let dir = tempfile::tempdir().unwrap();
        for name in [ENT_DOM_FILE, DOM_ENT_FILE, REL2DOM_H_FILE, REL2DOM_T_FILE] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::write(dir.path().join(REL2NN_FILE), r#"{"r1": 9}"#).unwrap();
        assert!(matches!(
            CommonsenseTables::load(dir.path()),
            Err(CakeError::InvalidComplexity(9))
        ));
    }
}
