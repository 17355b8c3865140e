//! Known (head, relation) -> tails lookup used to mask false negatives.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use crate::data::triplet::{read_triplets, reverse_triplet, Triplet};
use crate::error::Result;

/// All tails observed for each (head, relation), both directions included.
#[derive(Debug, Clone, Default)]
pub struct TripletDict {
    relations: FxHashSet<String>,
    hr2tails: FxHashMap<(String, String), FxHashSet<String>>,
}

impl TripletDict {
    /// Load one or more training triplet files.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut dict = Self::default();
        for path in paths {
            let triplets = read_triplets(path)?;
            dict.extend(&triplets);
        }
        info!(
            relations = dict.relations.len(),
            pairs = dict.hr2tails.len(),
            "Built triplet dictionary"
        );
        Ok(dict)
    }

    pub fn from_triplets(triplets: &[Triplet]) -> Self {
        let mut dict = Self::default();
        dict.extend(triplets);
        dict
    }

    fn extend(&mut self, triplets: &[Triplet]) {
        let reversed: Vec<Triplet> = triplets.iter().map(reverse_triplet).collect();
        for t in triplets.iter().chain(reversed.iter()) {
            self.relations.insert(t.relation.clone());
            self.hr2tails
                .entry((t.head_id.clone(), t.relation.clone()))
                .or_default()
                .insert(t.tail_id.clone());
        }
    }

    /// Tails known for `(head_id, relation)`, None when the pair was never seen.
    pub fn get_neighbors(&self, head_id: &str, relation: &str) -> Option<&FxHashSet<String>> {
        self.hr2tails
            .get(&(head_id.to_string(), relation.to_string()))
    }

    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_directions_indexed() {
        let dict = TripletDict::from_triplets(&[
            Triplet::new("h", "r", "t1"),
            Triplet::new("h", "r", "t2"),
        ]);

        let tails = dict.get_neighbors("h", "r").unwrap();
        assert_eq!(tails.len(), 2);
        assert!(tails.contains("t1"));

        let heads = dict.get_neighbors("t1", "inverse r").unwrap();
        assert!(heads.contains("h"));
        assert!(dict.get_neighbors("t1", "r").is_none());
        assert_eq!(dict.num_relations(), 2);
    }
}
