//! Examples, the indexed dataset, and batch collation.

mod collate;
#[allow(clippy::module_inception)]
mod dataset;
mod example;
mod mask;

pub use collate::{collate, collate_grouped, to_indices, to_indices_and_mask, Batch};
pub use dataset::{load_data, Dataset, DatasetInfo};
pub use example::{concat_name_desc, neighbor_desc, parse_entity_name, Example, VectorizedExample};
pub use mask::{construct_mask, construct_self_negative_mask};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use serde::Serialize;

    use crate::config::DataConfig;
    use crate::data::{EntityDict, EntityExample, LinkGraph, Triplet, TripletDict};
    use crate::hub::DataHub;
    use crate::text::VocabTokenizer;

    pub fn sample_entities() -> Vec<EntityExample> {
        vec![
            EntityExample::new("e1", "alice", "alice is a person"),
            EntityExample::new("e2", "bob", "a builder from the north"),
            EntityExample::new("e3", "carol", ""),
            EntityExample::new("e4", "dave", "dave"),
        ]
    }

    pub fn sample_triplets() -> Vec<Triplet> {
        vec![
            Triplet::new("e1", "knows", "e2"),
            Triplet::new("e3", "likes", "e1"),
            Triplet::new("e4", "knows", "e2"),
        ]
    }

    /// Hub over the sample graph. The link graph is attached either way; the
    /// config decides whether descriptions use it.
    pub fn sample_hub(config: DataConfig) -> DataHub {
        let entities = sample_entities();
        let triplets = sample_triplets();

        let mut corpus = String::new();
        for e in &entities {
            corpus.push_str(&format!("{} {} ", e.entity, e.entity_desc));
        }
        for t in &triplets {
            corpus.push_str(&format!("{} inverse ", t.relation));
        }
        let tokenizer = VocabTokenizer::from_text(&corpus, 64);

        DataHub::new(
            config,
            Arc::new(EntityDict::from_entities(entities)),
            Arc::new(TripletDict::from_triplets(&triplets)),
            Arc::new(tokenizer),
        )
        .with_link_graph(Arc::new(LinkGraph::from_triplets(&triplets)))
    }

    pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }
}
