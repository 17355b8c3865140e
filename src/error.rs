//! Error types for cake.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for batch preparation.
#[derive(Debug, Error)]
pub enum CakeError {
    /// Candle tensor operation failed
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Reading an input file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file was not valid JSON for its expected shape
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Triplet files must be JSON
    #[error("unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Neither forward nor backward triplets were requested
    #[error("at least one of forward or backward triplets must be enabled")]
    NoTripletDirection,

    /// An input path does not exist and no examples were supplied instead
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// Entity id not present in the entity directory
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Relation missing from the dataset index or commonsense tables
    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    /// Domain referenced by a relation but absent from dom_ent
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// Cardinality class outside 0..=3
    #[error("invalid relation complexity code: {0}")]
    InvalidComplexity(u8),

    /// Domain-constrained sampling had nothing to draw from
    #[error("no domain-constrained candidates for relation {relation} (requested {requested})")]
    EmptyCandidatePool { relation: String, requested: usize },

    /// Collation needs at least one example
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    /// Example index past the end of the dataset
    #[error("index error: {index} out of range for {len} examples")]
    Index { index: usize, len: usize },

    /// Tokenizer backend failed
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for cake operations.
pub type Result<T> = std::result::Result<T, CakeError>;
