//! Error types for the pipeline crate.

use data_loader::DataLoadError;
use thiserror::Error;

/// Which side of the rating matrix an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    User,
    Item,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::User => write!(f, "user"),
            Axis::Item => write!(f, "item"),
        }
    }
}

/// Errors raised by the pipeline stages and their I/O edges
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A filtered triple references an id the index map does not know.
    ///
    /// The index map is built from the very set being rewritten, so this
    /// means the pipeline broke its own invariants. Never recoverable.
    #[error("No index for {axis} id '{id}'")]
    MissingMapping { axis: Axis, id: String },

    /// A stored id list names the same id twice, so it cannot be a bijection
    #[error("Duplicate id '{id}' in index")]
    DuplicateId { id: String },

    /// Configuration rejected during validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure while reading or cleaning input rows
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
