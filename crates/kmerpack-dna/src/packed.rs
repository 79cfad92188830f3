//! Packed character sequences.
//!
//! A [`PackedSequence`] stores `len` characters of `char_bits` bits each in a vector
//! of words. Each word holds `W::BITS / char_bits` characters packed from the least
//! significant bit; the high bits that cannot hold a whole character are padding.
//! Padding bits and the unused slots after the last character are always zero.

use crate::alphabet::Alphabet;
use crate::errors::{PackError, Result};
use crate::word::{PackedWord, bit_mask, chars_per_word, validate_char_bits, words_needed};

/// An owned, bit-packed sequence of fixed-width characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSequence<W: PackedWord> {
    /// Packed words, first character in the lowest slot of `words[0]`.
    words: Vec<W>,
    /// Number of characters.
    len: usize,
    /// Bits per character.
    char_bits: u32,
}

impl<W: PackedWord> PackedSequence<W> {
    /// Pack a slice of character codes.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidCharBits`] for an unusable width and
    /// [`PackError::InvalidCode`] for a code wider than `char_bits`.
    pub fn from_codes(codes: &[u8], char_bits: u32) -> Result<Self> {
        validate_char_bits::<W>(char_bits)?;
        let per_word = chars_per_word::<W>(char_bits);
        let code_mask = bit_mask(char_bits);

        let mut words = Vec::with_capacity(words_needed::<W>(codes.len(), char_bits));
        for (chunk_index, chunk) in codes.chunks(per_word).enumerate() {
            let mut word: u64 = 0;
            for (slot, &code) in chunk.iter().enumerate() {
                if u64::from(code) > code_mask {
                    return Err(PackError::InvalidCode {
                        position: chunk_index * per_word + slot,
                        code,
                        char_bits,
                    });
                }
                word |= u64::from(code) << (slot as u32 * char_bits);
            }
            words.push(W::from_u64(word));
        }

        Ok(Self { words, len: codes.len(), char_bits })
    }

    /// Encode and pack ASCII bases using `alphabet`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidBase`] for a byte outside the alphabet, or
    /// [`PackError::InvalidCharBits`] if the alphabet does not fit in `W`.
    pub fn from_bytes(seq: &[u8], alphabet: Alphabet) -> Result<Self> {
        let codes = seq
            .iter()
            .enumerate()
            .map(|(position, &base)| {
                alphabet.encode(base).ok_or(PackError::InvalidBase { position, base })
            })
            .collect::<Result<Vec<u8>>>()?;
        Self::from_codes(&codes, alphabet.bits())
    }

    /// Adopt words that are already packed.
    ///
    /// Words beyond those needed for `len` are allowed but must be zero.
    ///
    /// # Errors
    ///
    /// - [`PackError::InvalidCharBits`] for an unusable width
    /// - [`PackError::InsufficientWords`] if `words` cannot hold `len` characters
    /// - [`PackError::NonZeroPadding`] if any bit outside the `len` characters is set
    pub fn from_words(words: Vec<W>, len: usize, char_bits: u32) -> Result<Self> {
        validate_char_bits::<W>(char_bits)?;
        let needed = words_needed::<W>(len, char_bits);
        if words.len() < needed {
            return Err(PackError::InsufficientWords { len, needed, available: words.len() });
        }

        let per_word = chars_per_word::<W>(char_bits);
        for (index, word) in words.iter().enumerate() {
            let used = len.saturating_sub(index * per_word).min(per_word);
            let allowed = bit_mask(used as u32 * char_bits);
            if word.to_u64() & !allowed != 0 {
                return Err(PackError::NonZeroPadding { word: index });
            }
        }

        Ok(Self { words, len, char_bits })
    }

    /// Packed words.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[W] {
        &self.words
    }

    /// Consume the sequence and return its words.
    #[must_use]
    pub fn into_words(self) -> Vec<W> {
        self.words
    }

    /// Number of characters.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the sequence has no characters.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per character.
    #[inline]
    #[must_use]
    pub const fn char_bits(&self) -> u32 {
        self.char_bits
    }

    /// Characters held by each word.
    #[inline]
    #[must_use]
    pub const fn chars_per_word(&self) -> usize {
        chars_per_word::<W>(self.char_bits)
    }

    /// Code of the character at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        let per_word = self.chars_per_word();
        let word = self.words[index / per_word].to_u64();
        let shift = (index % per_word) as u32 * self.char_bits;
        #[expect(clippy::cast_possible_truncation, reason = "masked to at most 8 bits")]
        let code = ((word >> shift) & bit_mask(self.char_bits)) as u8;
        Some(code)
    }

    /// All character codes in order.
    #[must_use]
    pub fn unpack(&self) -> Vec<u8> {
        (0..self.len).filter_map(|i| self.get(i)).collect()
    }

    /// Decode to upper-case ASCII with `alphabet`; codes outside it become `N`.
    #[must_use]
    pub fn to_bytes(&self, alphabet: Alphabet) -> Vec<u8> {
        self.unpack().into_iter().map(|code| alphabet.decode(code).unwrap_or(b'N')).collect()
    }
}
