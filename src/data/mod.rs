//! Read-only knowledge graph inputs: triplet records, entity texts, neighbors.

mod entity;
mod link_graph;
mod triplet;
mod triplet_dict;

pub use entity::{EntityDict, EntityExample};
pub use link_graph::{LinkGraph, DEFAULT_MAX_NEIGHBORS};
pub use triplet::{
    base_relation, ensure_json, inverse_relation, read_triplets, reverse_triplet, split_paths,
    Triplet, INVERSE_PREFIX,
};
pub use triplet_dict::TripletDict;
