//! Cake: commonsense-aware batch preparation for text-based knowledge graph
//! embedding.
//!
//! Triplets are read in both directions, turned into tokenized examples, and
//! grouped into training batches by a relation-aware sampler. Part of every
//! batch is drawn from examples whose tails share a commonsense domain with the
//! relation's expected tails, so in-batch negatives are hard but plausible.
//!
//! # Pipeline
//!
//! ```text
//! triplets.json ─▶ Dataset ─▶ DatasetInfo ─▶ RelationBatchSampler
//!                     │                            │ indices
//!                     ▼                            ▼
//!                  DataHub ◀──────────── Dataset::get_batch ─▶ collate ─▶ Batch
//! ```

pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod hub;
pub mod sampler;
pub mod text;

pub use config::{DataConfig, Task};
pub use data::{EntityDict, EntityExample, LinkGraph, Triplet, TripletDict};
pub use dataset::{collate, collate_grouped, Batch, Dataset, DatasetInfo, Example, VectorizedExample};
pub use error::{CakeError, Result};
pub use hub::DataHub;
pub use sampler::{CommonsenseTables, RelationBatchSampler, RelationComplexity};
pub use text::{Encoding, Tokenize, VocabTokenizer};
