//! Error types for matrix construction

use thiserror::Error;

/// Result type alias for matrix model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised when caller-supplied matrix data breaks an encoding invariant
#[derive(Debug, Error)]
pub enum ModelError {
    /// Sparse arrays violate the compressed-row invariants
    #[error("Invalid sparse matrix: {reason}")]
    InvalidSparse {
        /// Which invariant was broken
        reason: String,
    },

    /// Flat dense data does not hold `n * n` elements
    #[error("Dense matrix size mismatch: expected {expected} elements, got {got}")]
    DenseSizeMismatch {
        /// `n * n`
        expected: usize,
        /// Elements supplied
        got: usize,
    },
}

impl ModelError {
    /// Create an invalid sparse matrix error
    pub fn invalid_sparse(reason: impl Into<String>) -> Self {
        Self::InvalidSparse {
            reason: reason.into(),
        }
    }
}
