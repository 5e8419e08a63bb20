//! Error types for the data module.

use thiserror::Error;

/// Data batching errors
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    #[error("example {index} is missing its {segment} segment")]
    MalformedExample { index: usize, segment: &'static str },
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
