//! Error types for range construction and arithmetic.

use thiserror::Error;

/// Result type alias for range operations
pub type Result<T> = std::result::Result<T, RangeError>;

/// Error type for range operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Range constructed with `end < start` or a negative overlap
    #[error("Invalid range [{start}, {end}) overlap {overlap}: {reason}")]
    InvalidRange {
        /// Requested start
        start: String,
        /// Requested end
        end: String,
        /// Requested overlap
        overlap: String,
        /// Which invariant was violated
        reason: &'static str,
    },

    /// Merge of two ranges that neither overlap nor touch
    #[error("Cannot merge disjoint ranges [{first}) and [{second})")]
    DisjointRange {
        /// First range as `start:end`
        first: String,
        /// Second range as `start:end`
        second: String,
    },

    /// Page alignment requested with a zero or negative page size
    #[error("Invalid page size {page_size}: must be greater than 0")]
    InvalidPageSize {
        /// The rejected page size
        page_size: String,
    },

    /// Aligned start would fall below the minimum value of the domain
    #[error("Cannot align {start} to page size {page_size}: within one page of the type minimum")]
    RangeUnderflow {
        /// The start that could not be aligned
        start: String,
        /// The page size
        page_size: String,
    },

    /// Shift that would move a bound outside the domain of the coordinate type
    #[error("Cannot shift [{start}, {end}) by {amount}: bound leaves the type domain")]
    ShiftOutOfDomain {
        /// Start of the range being shifted
        start: String,
        /// End of the range being shifted
        end: String,
        /// Signed shift amount
        amount: String,
    },

    /// Partition requested with zero parts
    #[error("Invalid partition: {reason}")]
    InvalidPartition {
        /// Explanation of the problem
        reason: String,
    },
}
