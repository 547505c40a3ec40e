//! Error types for driver operations

use spmm_chip::BURST_ROWS;
use spmm_models::ModelError;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while driving the device
#[derive(Debug, Error)]
pub enum DriverError {
    /// A ready line never asserted within the cycle budget.
    ///
    /// Fatal for the running scenario: the device is left mid-protocol and
    /// must be reset before reuse.
    #[error("Timeout after {cycles} cycles waiting for {waiting_for}")]
    Timeout {
        /// Cycles elapsed since reset when the budget ran out
        cycles: u64,
        /// Signal the driver was blocked on
        waiting_for: &'static str,
    },

    /// Device dimension the burst layout cannot carry
    #[error("Unsupported matrix dimension {n}: must be a positive multiple of {burst}")]
    UnsupportedSize {
        /// Requested dimension
        n: usize,
        /// Dense burst height
        burst: usize,
    },

    /// Data read back from the device could not form a matrix
    #[error("Malformed device output: {0}")]
    Model(#[from] ModelError),
}

impl DriverError {
    /// Create a timeout error
    pub const fn timeout(cycles: u64, waiting_for: &'static str) -> Self {
        Self::Timeout {
            cycles,
            waiting_for,
        }
    }

    /// Create an unsupported size error
    pub const fn unsupported_size(n: usize) -> Self {
        Self::UnsupportedSize {
            n,
            burst: BURST_ROWS,
        }
    }

    /// Attach the signal being waited on to a timeout
    #[must_use]
    pub fn waiting_for(self, signal: &'static str) -> Self {
        match self {
            Self::Timeout { cycles, .. } => Self::timeout(cycles, signal),
            other => other,
        }
    }

    /// Whether this is the fatal protocol timeout
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
