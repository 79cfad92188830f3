//! The [`Range`] value type and page alignment helpers.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use num_traits::{Num, PrimInt, Zero};

use crate::errors::{RangeError, Result};

/// A coordinate type usable as a range bound.
///
/// Integer domains report their size as an unsigned `u64`; floating point domains
/// report it in their own type.
pub trait RangeValue: Num + Copy + PartialOrd + fmt::Display + fmt::Debug {
    /// The type returned by [`Range::size`].
    type Size: Copy + PartialOrd + Zero + fmt::Debug;

    /// Distance from `start` to `end`, assuming `start <= end`.
    fn span(start: Self, end: Self) -> Self::Size;
}

macro_rules! impl_integer_range_value {
    ($($t:ty),* $(,)?) => {$(
        impl RangeValue for $t {
            type Size = u64;

            #[inline]
            #[allow(clippy::cast_lossless, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            fn span(start: Self, end: Self) -> u64 {
                (end as i128 - start as i128) as u64
            }
        }
    )*};
}

macro_rules! impl_float_range_value {
    ($($t:ty),* $(,)?) => {$(
        impl RangeValue for $t {
            type Size = $t;

            #[inline]
            fn span(start: Self, end: Self) -> $t {
                end - start
            }
        }
    )*};
}

impl_integer_range_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_float_range_value!(f32, f64);

#[inline]
fn partial_min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

#[inline]
fn partial_max<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

/// A half-open interval `[start, end)` with a trailing overlap.
///
/// `overlap` is the length of `[end - overlap, end)`, the part of this range that
/// also belongs to the next one. All computations include the overlap region;
/// the overlap length is metadata for the caller.
///
/// Equality compares `start` and `end` only.
#[derive(Debug, Clone, Copy)]
pub struct Range<T: RangeValue> {
    start: T,
    end: T,
    overlap: T,
}

impl<T: RangeValue> Range<T> {
    /// Create a range with no overlap.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidRange`] if `end < start`.
    pub fn new(start: T, end: T) -> Result<Self> {
        Self::with_overlap(start, end, T::zero())
    }

    /// Create a range with a trailing overlap.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidRange`] if `end < start` or `overlap < 0`.
    pub fn with_overlap(start: T, end: T, overlap: T) -> Result<Self> {
        let invalid = |reason| RangeError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
            overlap: overlap.to_string(),
            reason,
        };
        if end < start {
            return Err(invalid("end is less than start"));
        }
        if overlap < T::zero() {
            return Err(invalid("overlap is less than 0"));
        }
        Ok(Self { start, end, overlap })
    }

    /// Inclusive start.
    #[inline]
    #[must_use]
    pub fn start(&self) -> T {
        self.start
    }

    /// Exclusive end, including the overlap region.
    #[inline]
    #[must_use]
    pub fn end(&self) -> T {
        self.end
    }

    /// Length of the trailing region shared with the next range.
    #[inline]
    #[must_use]
    pub fn overlap(&self) -> T {
        self.overlap
    }

    /// `end - start`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> T::Size {
        T::span(self.start, self.end)
    }

    /// True if the range has zero size.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() <= T::Size::zero()
    }

    /// Union of two ranges that overlap or touch.
    ///
    /// The overlap is taken from whichever input ends later.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::DisjointRange`] if the ranges are disjoint.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        if self.is_disjoint(other) {
            return Err(RangeError::DisjointRange {
                first: format!("{}:{}", self.start, self.end),
                second: format!("{}:{}", other.start, other.end),
            });
        }
        let overlap = if self.end < other.end { other.overlap } else { self.overlap };
        Ok(Self {
            start: partial_min(self.start, other.start),
            end: partial_max(self.end, other.end),
            overlap,
        })
    }

    /// Intersection of two ranges.
    ///
    /// Never fails: when the inputs do not overlap the result is an empty range
    /// positioned at the smaller of the two ends.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let overlap = if self.end > other.end { other.overlap } else { self.overlap };
        let end = partial_min(self.end, other.end);
        let start = partial_min(partial_max(self.start, other.start), end);
        Self { start, end, overlap }
    }

    /// True if `other` is non-empty and lies entirely inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        !other.is_empty() && other.start >= self.start && other.end <= self.end
    }

    /// True if the intersection has positive size.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// True if one range ends exactly where the other starts.
    #[must_use]
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.start == other.end || self.end == other.start
    }

    /// True if there is a gap between the two ranges.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.start > other.end || self.end < other.start
    }

    /// Translate both bounds toward larger values.
    ///
    /// The bounds must stay representable in `T`; integer ranges near
    /// `T::max_value()` should use [`Range::checked_shift_right`].
    #[must_use]
    pub fn shift_right(&self, amount: T) -> Self {
        Self { start: self.start + amount, end: self.end + amount, overlap: self.overlap }
    }

    /// Translate both bounds toward smaller values.
    ///
    /// The bounds must stay representable in `T`; integer ranges near
    /// `T::min_value()` should use [`Range::checked_shift_left`].
    #[must_use]
    pub fn shift_left(&self, amount: T) -> Self {
        Self { start: self.start - amount, end: self.end - amount, overlap: self.overlap }
    }
}

impl<T: RangeValue + PrimInt> Range<T> {
    /// The largest multiple of `page_size` not exceeding this range's start.
    ///
    /// # Errors
    ///
    /// See [`align_to_page_start`].
    pub fn align_to_page(&self, page_size: T) -> Result<T> {
        align_to_page_start(self.start, page_size)
    }

    /// True if this range's start is a multiple of `page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidPageSize`] for a non-positive page size.
    pub fn is_page_aligned(&self, page_size: T) -> Result<bool> {
        is_page_aligned(self.start, page_size)
    }

    /// [`Range::shift_right`] that fails instead of overflowing.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ShiftOutOfDomain`] if `end + amount` (or
    /// `start + amount` for a negative amount) is not representable in `T`.
    pub fn checked_shift_right(&self, amount: T) -> Result<Self> {
        match (self.start.checked_add(&amount), self.end.checked_add(&amount)) {
            (Some(start), Some(end)) => Ok(Self { start, end, overlap: self.overlap }),
            _ => Err(self.shift_error(amount, "")),
        }
    }

    /// [`Range::shift_left`] that fails instead of underflowing.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ShiftOutOfDomain`] if `start - amount` (or
    /// `end - amount` for a negative amount) is not representable in `T`.
    pub fn checked_shift_left(&self, amount: T) -> Result<Self> {
        match (self.start.checked_sub(&amount), self.end.checked_sub(&amount)) {
            (Some(start), Some(end)) => Ok(Self { start, end, overlap: self.overlap }),
            _ => Err(self.shift_error(amount, "-")),
        }
    }

    fn shift_error(&self, amount: T, sign: &str) -> RangeError {
        RangeError::ShiftOutOfDomain {
            start: self.start.to_string(),
            end: self.end.to_string(),
            amount: format!("{sign}{amount}"),
        }
    }
}

/// Align `start` down to the largest multiple of `page_size` that is `<= start`.
///
/// Division truncates toward zero, so negative starts are stepped down one more
/// page.
///
/// # Errors
///
/// - [`RangeError::InvalidPageSize`] if `page_size <= 0`
/// - [`RangeError::RangeUnderflow`] if the aligned value is below `T::min_value()`
///
/// # Example
///
/// ```
/// use kmerpack_range::align_to_page_start;
///
/// assert_eq!(align_to_page_start(4097u64, 4096).unwrap(), 4096);
/// assert_eq!(align_to_page_start(-5i32, 4).unwrap(), -8);
/// ```
pub fn align_to_page_start<T: PrimInt + fmt::Display>(start: T, page_size: T) -> Result<T> {
    if page_size <= T::zero() {
        return Err(RangeError::InvalidPageSize { page_size: page_size.to_string() });
    }
    let block_start = (start / page_size) * page_size;
    if block_start > start {
        return block_start.checked_sub(&page_size).ok_or_else(|| RangeError::RangeUnderflow {
            start: start.to_string(),
            page_size: page_size.to_string(),
        });
    }
    Ok(block_start)
}

/// True if `start` is a multiple of `page_size`.
///
/// # Errors
///
/// Returns [`RangeError::InvalidPageSize`] if `page_size <= 0`.
pub fn is_page_aligned<T: PrimInt + fmt::Display>(start: T, page_size: T) -> Result<bool> {
    if page_size <= T::zero() {
        return Err(RangeError::InvalidPageSize { page_size: page_size.to_string() });
    }
    Ok((start % page_size).is_zero())
}

impl<T: RangeValue> PartialEq for Range<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl<T: RangeValue> Default for Range<T> {
    fn default() -> Self {
        Self { start: T::zero(), end: T::zero(), overlap: T::zero() }
    }
}

impl<T: RangeValue> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "range: block [{}:{}) overlap {}", self.start, self.end, self.overlap)
    }
}

impl<T: RangeValue> Add<T> for Range<T> {
    type Output = Self;

    fn add(self, amount: T) -> Self {
        self.shift_right(amount)
    }
}

impl<T: RangeValue> AddAssign<T> for Range<T> {
    fn add_assign(&mut self, amount: T) {
        *self = self.shift_right(amount);
    }
}

impl<T: RangeValue> Sub<T> for Range<T> {
    type Output = Self;

    fn sub(self, amount: T) -> Self {
        self.shift_left(amount)
    }
}

impl<T: RangeValue> SubAssign<T> for Range<T> {
    fn sub_assign(&mut self, amount: T) {
        *self = self.shift_left(amount);
    }
}
