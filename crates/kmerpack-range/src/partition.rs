//! Block partitioning of an integer range into near-equal chunks.

use std::fmt;

use num_traits::{NumCast, PrimInt};

use crate::errors::{RangeError, Result};
use crate::range::{Range, RangeValue};

fn cast<T: NumCast>(value: u64) -> Result<T> {
    T::from(value).ok_or_else(|| RangeError::InvalidPartition {
        reason: format!("offset {value} does not fit the range domain"),
    })
}

/// Split `range` into `parts` contiguous chunks.
///
/// Chunk sizes differ by at most one, larger chunks first. Every chunk except the
/// last has its end extended by `overlap`, clamped to the parent end, and records
/// the extension actually applied as its overlap. The last chunk keeps the parent
/// overlap. When `parts` exceeds the range size the trailing chunks are empty.
///
/// Ignoring the overlap extensions, the chunks tile the parent range exactly.
///
/// # Errors
///
/// - [`RangeError::InvalidPartition`] if `parts == 0`
/// - [`RangeError::InvalidRange`] if `overlap` is negative
pub fn block_partition<T>(range: &Range<T>, parts: usize, overlap: T) -> Result<Vec<Range<T>>>
where
    T: RangeValue<Size = u64> + PrimInt + fmt::Display,
{
    if parts == 0 {
        return Err(RangeError::InvalidPartition {
            reason: "number of parts must be greater than 0".to_string(),
        });
    }
    if overlap < T::zero() {
        return Err(RangeError::InvalidRange {
            start: range.start().to_string(),
            end: range.end().to_string(),
            overlap: overlap.to_string(),
            reason: "overlap is less than 0",
        });
    }

    let total = range.size();
    let parts_u64 = parts as u64;
    let base = total / parts_u64;
    let remainder = total % parts_u64;

    let mut chunks = Vec::with_capacity(parts);
    let mut start = range.start();
    for i in 0..parts_u64 {
        let len = if i < remainder { base + 1 } else { base };
        let end = start + cast::<T>(len)?;
        let chunk = if i + 1 == parts_u64 {
            Range::with_overlap(start, end, range.overlap())?
        } else {
            // Room left before the parent end; avoids overflow near T::max_value().
            let room = range.end() - end;
            let extension = if overlap < room { overlap } else { room };
            Range::with_overlap(start, end + extension, extension)?
        };
        chunks.push(chunk);
        start = end;
    }
    Ok(chunks)
}
