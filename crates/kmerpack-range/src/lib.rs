#![deny(unsafe_code)]

//! Half-open ranges with a trailing overlap.
//!
//! A [`Range`] describes `[start, end)` over an integer or floating point domain,
//! together with the length of the tail `[end - overlap, end)` that is shared with
//! the next range. Ranges are used to carve a corpus into chunks so that windowed
//! computations near a chunk boundary see enough context without a second pass.
//!
//! # Example
//!
//! ```
//! use kmerpack_range::{Range, block_partition};
//!
//! let reads = Range::new(0u64, 10).unwrap();
//! let chunks = block_partition(&reads, 3, 2).unwrap();
//! assert_eq!(chunks[0], Range::new(0, 6).unwrap()); // 4 reads + 2 overlap
//! assert_eq!(chunks[2], Range::new(7, 10).unwrap());
//! ```

pub mod errors;
pub mod partition;
pub mod range;

pub use errors::{RangeError, Result};
pub use partition::block_partition;
pub use range::{Range, RangeValue, align_to_page_start, is_page_aligned};
