//! Batch samplers over a [`Dataset`](crate::dataset::Dataset)'s indices.

mod commonsense;
mod relation;

pub use commonsense::{
    CommonsenseTables, DomainId, RelationComplexity, DOM_ENT_FILE, ENT_DOM_FILE, REL2DOM_H_FILE,
    REL2DOM_T_FILE, REL2NN_FILE,
};
pub use relation::{BatchComposition, RelationBatchSampler, RelationBatches};
