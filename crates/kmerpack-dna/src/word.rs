//! Unsigned word types that carry packed characters.

use std::fmt::Debug;

use crate::MAX_CHAR_BITS;
use crate::errors::{PackError, Result};

/// An unsigned integer used as the storage unit of a packed sequence.
pub trait PackedWord: Copy + Default + Eq + Debug + Send + Sync + 'static {
    /// Width of the word in bits.
    const BITS: u32;

    /// Widen to `u64`.
    fn to_u64(self) -> u64;

    /// Narrow from `u64`, keeping the low `BITS` bits.
    fn from_u64(value: u64) -> Self;
}

macro_rules! impl_packed_word {
    ($($t:ty),* $(,)?) => {$(
        impl PackedWord for $t {
            const BITS: u32 = <$t>::BITS;

            #[inline]
            fn to_u64(self) -> u64 {
                u64::from(self)
            }

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn from_u64(value: u64) -> Self {
                value as $t
            }
        }
    )*};
}

impl_packed_word!(u8, u16, u32, u64);

/// Mask with the low `bits` bits set; saturates at 64.
#[inline]
#[must_use]
pub const fn bit_mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Check that `char_bits` is usable with words of type `W`.
///
/// # Errors
///
/// Returns [`PackError::InvalidCharBits`] unless `1 <= char_bits <= 8` and
/// `char_bits <= W::BITS`.
pub fn validate_char_bits<W: PackedWord>(char_bits: u32) -> Result<()> {
    if char_bits == 0 || char_bits > MAX_CHAR_BITS || char_bits > W::BITS {
        return Err(PackError::InvalidCharBits { char_bits, word_bits: W::BITS });
    }
    Ok(())
}

/// Number of whole characters that fit in one `W`.
///
/// `char_bits` must be non-zero.
#[inline]
#[must_use]
pub const fn chars_per_word<W: PackedWord>(char_bits: u32) -> usize {
    (W::BITS / char_bits) as usize
}

/// Number of words needed to hold `len` characters.
#[inline]
#[must_use]
pub const fn words_needed<W: PackedWord>(len: usize, char_bits: u32) -> usize {
    len.div_ceil(chars_per_word::<W>(char_bits))
}
