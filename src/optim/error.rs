//! Error types for the optimizer module.

use thiserror::Error;

/// Optimizer errors
#[derive(Debug, Error)]
pub enum OptimError {
    #[error("sparse gradient on parameter {index} in group {group}: dense accumulation required")]
    UnsupportedGradient { group: usize, index: usize },

    #[error("parameter group is missing its lr_scale")]
    MissingLrScale,
}

/// Result type for optimizer operations
pub type Result<T> = std::result::Result<T, OptimError>;
