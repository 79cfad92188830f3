//! Custom error types for key encoding and scheduling.

use kmerpack_dna::PackError;
use kmerpack_range::RangeError;
use thiserror::Error;

/// Result type alias for kmerpack operations
pub type Result<T> = std::result::Result<T, KmerError>;

/// Error type for kmerpack operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KmerError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// The cursor ran past the packed words before all keys were produced
    #[error("Sequence bounds exceeded: wrote {written} of {expected} keys")]
    SequenceBoundsExceeded {
        /// Keys written before the cursor ran out
        written: usize,
        /// Keys the unit should have produced
        expected: usize,
    },

    /// The worker pool could not be created
    #[error("Scheduler unavailable: {reason}")]
    SchedulerUnavailable {
        /// Explanation of the problem
        reason: String,
    },

    /// Range construction or partitioning failed
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Sequence packing failed
    #[error(transparent)]
    Pack(#[from] PackError),
}

impl KmerError {
    /// Shorthand for [`KmerError::InvalidParameter`].
    pub(crate) fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter: parameter.to_string(), reason: reason.into() }
    }
}
