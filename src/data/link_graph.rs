//! Undirected neighbor graph over training triplets.

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::info;

use crate::data::triplet::{read_triplets, Triplet};
use crate::error::Result;

/// Neighbors kept per entity unless the caller asks otherwise.
pub const DEFAULT_MAX_NEIGHBORS: usize = 10;

/// Entity id -> sorted set of entities it shares a training triplet with.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    graph: FxHashMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    /// Build from a training triplet file.
    pub fn load(train_path: impl AsRef<Path>) -> Result<Self> {
        let path = train_path.as_ref();
        let triplets = read_triplets(path)?;
        let graph = Self::from_triplets(&triplets);
        info!(
            entities = graph.len(),
            path = %path.display(),
            "Built link graph"
        );
        Ok(graph)
    }

    pub fn from_triplets(triplets: &[Triplet]) -> Self {
        let mut graph: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();
        for t in triplets {
            graph
                .entry(t.head_id.clone())
                .or_default()
                .insert(t.tail_id.clone());
            graph
                .entry(t.tail_id.clone())
                .or_default()
                .insert(t.head_id.clone());
        }
        Self { graph }
    }

    /// Up to `max_to_keep` neighbor ids in sorted order.
    pub fn get_neighbor_ids(&self, entity_id: &str, max_to_keep: usize) -> Vec<String> {
        self.graph
            .get(entity_id)
            .map(|neighbors| neighbors.iter().take(max_to_keep).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entities with at least one neighbor.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_symmetric_and_sorted() {
        let graph = LinkGraph::from_triplets(&[
            Triplet::new("b", "r", "c"),
            Triplet::new("b", "r", "a"),
            Triplet::new("d", "r2", "b"),
        ]);

        assert_eq!(graph.get_neighbor_ids("b", 10), vec!["a", "c", "d"]);
        assert_eq!(graph.get_neighbor_ids("a", 10), vec!["b"]);
        assert_eq!(graph.get_neighbor_ids("b", 2), vec!["a", "c"]);
        assert!(graph.get_neighbor_ids("zz", 10).is_empty());
    }
}
