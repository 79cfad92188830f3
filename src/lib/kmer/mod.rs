//! Rolling k-mer key encoding over packed sequences.
//!
//! A key is a `u64` holding `K` characters of `char_bits` bits each, the earliest
//! character of the window in the lowest bit group. Each unit (read) of length
//! `L >= K` yields `L - K + 1` keys, one per window position, left to right.
//!
//! # Example
//!
//! ```
//! use kmerpack_dna::{Alphabet, PackedSequence};
//! use kmerpack_lib::kmer::{KmerParams, ScalarEncoder};
//!
//! let seq = PackedSequence::<u16>::from_bytes(b"ACGT", Alphabet::Dna).unwrap();
//! let encoder = ScalarEncoder::new(KmerParams::new(2, 2).unwrap());
//! assert_eq!(encoder.encode_sequence(&seq).unwrap(), vec![4, 9, 14]);
//! ```

pub mod reverse;
pub mod scalar;

pub use reverse::{canonical_key, reverse_complement_key, reverse_key};
pub use scalar::{KmerIter, ScalarEncoder};

use kmerpack_dna::{Alphabet, MAX_CHAR_BITS, PackedWord, bit_mask};

use crate::errors::{KmerError, Result};

/// Window length and character width of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerParams {
    k: usize,
    char_bits: u32,
}

impl KmerParams {
    /// Validate and build key parameters.
    ///
    /// Requires `k >= 1`, `1 <= char_bits <= 8` and `k * char_bits <= 64`.
    pub fn new(k: usize, char_bits: u32) -> Result<Self> {
        if k == 0 {
            return Err(KmerError::invalid_parameter("k", "must be >= 1"));
        }
        if char_bits == 0 || char_bits > MAX_CHAR_BITS {
            return Err(KmerError::invalid_parameter(
                "char_bits",
                format!("{char_bits} is not in 1..={MAX_CHAR_BITS}"),
            ));
        }
        if k.saturating_mul(char_bits as usize) > 64 {
            return Err(KmerError::invalid_parameter(
                "k",
                format!("{k} characters of {char_bits} bits do not fit in a 64-bit key"),
            ));
        }
        Ok(Self { k, char_bits })
    }

    /// Parameters using the character width of `alphabet`.
    pub fn for_alphabet(k: usize, alphabet: Alphabet) -> Result<Self> {
        Self::new(k, alphabet.bits())
    }

    /// Window length in characters.
    #[inline]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Bits per character.
    #[inline]
    pub const fn char_bits(&self) -> u32 {
        self.char_bits
    }

    /// Significant bits of a key.
    #[inline]
    pub const fn key_bits(&self) -> u32 {
        self.k as u32 * self.char_bits
    }

    /// Mask covering the significant bits of a key.
    #[inline]
    pub const fn key_mask(&self) -> u64 {
        bit_mask(self.key_bits())
    }

    /// Mask covering one character.
    #[inline]
    pub const fn char_mask(&self) -> u64 {
        bit_mask(self.char_bits)
    }

    /// Keys produced by a unit of `len` characters: `len - k + 1`, or 0.
    #[inline]
    pub const fn key_count(&self, len: usize) -> usize {
        if len >= self.k { len - self.k + 1 } else { 0 }
    }

    /// Check that words of type `W` hold at least one character.
    pub fn check_word<W: PackedWord>(&self) -> Result<()> {
        if self.char_bits > W::BITS {
            return Err(KmerError::invalid_parameter(
                "char_bits",
                format!("{} bits do not fit in a {}-bit word", self.char_bits, W::BITS),
            ));
        }
        Ok(())
    }
}

/// A backend that turns one packed unit into its keys.
///
/// Implementations must produce exactly the keys of [`ScalarEncoder`] for the same
/// parameters.
pub trait KeyEncoder: Send + Sync {
    /// Key parameters this encoder was built with.
    fn params(&self) -> KmerParams;

    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Encode the unit stored in `words` with `len` characters into `out`.
    ///
    /// `out` must have exactly `params().key_count(len)` slots. Returns the number
    /// of keys written.
    ///
    /// # Errors
    ///
    /// - [`KmerError::InvalidParameter`] if `out` has the wrong length or `W` is too
    ///   narrow for the character width
    /// - [`KmerError::SequenceBoundsExceeded`] if `words` runs out before all keys
    ///   are produced; keys already written are left in `out`
    fn encode_unit<W: PackedWord>(&self, words: &[W], len: usize, out: &mut [u64])
    -> Result<usize>;
}
