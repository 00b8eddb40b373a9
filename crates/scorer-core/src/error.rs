//! Scorer error types.

use scorer_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors that can occur during scoring and description updates.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The embedder could not produce a vector
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Direct lookup of a label that was never created
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// Description and vector sequences disagree
    #[error("Invariant violation for label {label}: {descriptions} descriptions, {vectors} vectors")]
    InvariantViolation {
        label: String,
        descriptions: usize,
        vectors: usize,
    },

    /// A stored vector is not a unit vector of the snapshot's dimension
    #[error("Invalid vector {index} for label {label}: {reason}")]
    InvalidVector {
        label: String,
        index: usize,
        reason: String,
    },

    /// Invalid scorer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Poisoned store lock
    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, ScorerError>;
