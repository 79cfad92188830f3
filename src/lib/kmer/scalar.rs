//! Scalar seed-then-slide key encoder.

use kmerpack_dna::{PackedSequence, PackedWord, bit_mask, chars_per_word};
use log::error;

use crate::errors::{KmerError, Result};
use crate::kmer::{KeyEncoder, KmerParams};

/// Iterator over the keys of one packed unit.
///
/// The first key is seeded from the first `K` characters by concatenating the
/// significant bits of whole words and the low characters of the next word. Each
/// following key shifts the previous one right by one character and inserts the
/// character under the cursor at the top of the window.
///
/// Iteration stops early if the cursor runs past the end of `words`; check
/// [`KmerIter::bounds_exceeded`] afterwards.
#[derive(Debug, Clone)]
pub struct KmerIter<'a, W: PackedWord> {
    words: &'a [W],
    char_bits: u32,
    k: usize,
    per_word: usize,
    char_mask: u64,
    /// Bit offset of the newest character, `(K - 1) * char_bits`.
    top_shift: u32,
    key: u64,
    remaining: usize,
    seeded: bool,
    word_index: usize,
    slot: usize,
    exceeded: bool,
}

impl<'a, W: PackedWord> KmerIter<'a, W> {
    /// Iterate the keys of a unit of `len` characters stored in `words`.
    pub fn new(words: &'a [W], len: usize, params: KmerParams) -> Result<Self> {
        params.check_word::<W>()?;
        let per_word = chars_per_word::<W>(params.char_bits());
        Ok(Self {
            words,
            char_bits: params.char_bits(),
            k: params.k(),
            per_word,
            char_mask: params.char_mask(),
            top_shift: (params.k() as u32 - 1) * params.char_bits(),
            key: 0,
            remaining: params.key_count(len),
            seeded: false,
            word_index: params.k() / per_word,
            slot: params.k() % per_word,
            exceeded: false,
        })
    }

    /// Iterate the keys of a packed sequence.
    pub fn from_sequence(seq: &'a PackedSequence<W>, params: KmerParams) -> Result<Self> {
        if seq.char_bits() != params.char_bits() {
            return Err(KmerError::invalid_parameter(
                "char_bits",
                format!(
                    "sequence uses {} bits per character but keys use {}",
                    seq.char_bits(),
                    params.char_bits()
                ),
            ));
        }
        Self::new(seq.words(), seq.len(), params)
    }

    /// True if the cursor ran past the end of the words.
    #[inline]
    pub fn bounds_exceeded(&self) -> bool {
        self.exceeded
    }

    fn seed(&self) -> Option<u64> {
        let whole = self.k / self.per_word;
        let rest = self.k % self.per_word;
        let needed = whole + usize::from(rest > 0);
        if self.words.len() < needed {
            return None;
        }

        let significant_bits = self.per_word as u32 * self.char_bits;
        let significant = bit_mask(significant_bits);
        let mut key = 0u64;
        for (j, word) in self.words[..whole].iter().enumerate() {
            key |= (word.to_u64() & significant) << (j as u32 * significant_bits);
        }
        if rest > 0 {
            let tail = self.words[whole].to_u64() & bit_mask(rest as u32 * self.char_bits);
            key |= tail << (whole as u32 * significant_bits);
        }
        Some(key)
    }

    fn slide(&mut self) -> Option<u64> {
        let word = self.words.get(self.word_index)?.to_u64();
        let next = (word >> (self.slot as u32 * self.char_bits)) & self.char_mask;
        self.slot += 1;
        if self.slot == self.per_word {
            self.slot = 0;
            self.word_index += 1;
        }
        Some((self.key >> self.char_bits) | (next << self.top_shift))
    }
}

impl<W: PackedWord> Iterator for KmerIter<'_, W> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 || self.exceeded {
            return None;
        }
        let key = if self.seeded {
            self.slide()
        } else {
            self.seeded = true;
            self.seed()
        };
        match key {
            Some(key) => {
                self.key = key;
                self.remaining -= 1;
                Some(key)
            }
            None => {
                self.exceeded = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exceeded { (0, Some(0)) } else { (0, Some(self.remaining)) }
    }
}

/// Reference encoder stepping one character at a time.
#[derive(Debug, Clone, Copy)]
pub struct ScalarEncoder {
    params: KmerParams,
}

impl ScalarEncoder {
    /// Create an encoder for `params`.
    pub const fn new(params: KmerParams) -> Self {
        Self { params }
    }

    /// Encode a whole packed sequence into a new vector.
    pub fn encode_sequence<W: PackedWord>(&self, seq: &PackedSequence<W>) -> Result<Vec<u64>> {
        let mut iter = KmerIter::from_sequence(seq, self.params)?;
        let keys: Vec<u64> = iter.by_ref().collect();
        if iter.bounds_exceeded() {
            return Err(KmerError::SequenceBoundsExceeded {
                written: keys.len(),
                expected: self.params.key_count(seq.len()),
            });
        }
        Ok(keys)
    }
}

impl KeyEncoder for ScalarEncoder {
    fn params(&self) -> KmerParams {
        self.params
    }

    fn name(&self) -> &'static str {
        "scalar"
    }

    fn encode_unit<W: PackedWord>(
        &self,
        words: &[W],
        len: usize,
        out: &mut [u64],
    ) -> Result<usize> {
        let expected = self.params.key_count(len);
        if out.len() != expected {
            return Err(KmerError::invalid_parameter(
                "out",
                format!("buffer has {} slots but the unit yields {expected} keys", out.len()),
            ));
        }

        let mut iter = KmerIter::new(words, len, self.params)?;
        let mut written = 0;
        for (slot, key) in out.iter_mut().zip(iter.by_ref()) {
            *slot = key;
            written += 1;
        }

        if iter.bounds_exceeded() {
            error!(
                "Cursor ran past {} words of a {len}-character unit after {written} of {expected} keys",
                words.len()
            );
            return Err(KmerError::SequenceBoundsExceeded { written, expected });
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kmerpack_dna::Alphabet;
    use proptest::prelude::*;
    use rstest::rstest;

    /// Keys computed window by window from unpacked codes.
    fn naive_keys(codes: &[u8], params: KmerParams) -> Vec<u64> {
        if codes.len() < params.k() {
            return Vec::new();
        }
        codes
            .windows(params.k())
            .map(|window| {
                window.iter().enumerate().fold(0u64, |key, (j, &c)| {
                    key | (u64::from(c) << (j as u32 * params.char_bits()))
                })
            })
            .collect()
    }

    fn encode_with<W: PackedWord>(codes: &[u8], params: KmerParams) -> Vec<u64> {
        let seq = PackedSequence::<W>::from_codes(codes, params.char_bits()).unwrap();
        let encoder = ScalarEncoder::new(params);
        let mut out = vec![0u64; params.key_count(codes.len())];
        let written = encoder.encode_unit(seq.words(), seq.len(), &mut out).unwrap();
        assert_eq!(written, out.len());
        out
    }

    #[test]
    fn test_acgt_two_bit_k2() {
        let params = KmerParams::new(2, 2).unwrap();
        assert_eq!(encode_with::<u8>(&[0, 1, 2, 3], params), vec![4, 9, 14]);
        assert_eq!(encode_with::<u64>(&[0, 1, 2, 3], params), vec![4, 9, 14]);
    }

    #[test]
    fn test_all_zero_sequence() {
        let params = KmerParams::new(3, 3).unwrap();
        let keys = encode_with::<u16>(&[0; 17], params);
        assert_eq!(keys, vec![0; 15]);
    }

    #[rstest]
    #[case(2, "shorter than k")]
    #[case(0, "empty")]
    fn test_short_units_yield_nothing(#[case] len: usize, #[case] description: &str) {
        let params = KmerParams::new(3, 2).unwrap();
        let encoder = ScalarEncoder::new(params);
        let mut out = Vec::new();
        let written = encoder.encode_unit::<u32>(&[0], len, &mut out).unwrap();
        assert_eq!(written, 0, "Failed for: {description}");
    }

    #[test]
    fn test_single_key_when_len_equals_k() {
        let params = KmerParams::new(4, 2).unwrap();
        assert_eq!(encode_with::<u8>(&[3, 0, 0, 1], params), vec![0b01_00_00_11]);
    }

    #[test]
    fn test_wrong_buffer_length() {
        let params = KmerParams::new(2, 2).unwrap();
        let encoder = ScalarEncoder::new(params);
        let mut out = vec![0u64; 2];
        let err = encoder.encode_unit::<u8>(&[0b11_10_01_00], 4, &mut out).unwrap_err();
        assert!(matches!(err, KmerError::InvalidParameter { .. }));
    }

    #[test]
    fn test_bounds_exceeded_keeps_partial_output() {
        // 8 characters declared, but only one u8 word (4 characters) supplied.
        let params = KmerParams::new(2, 2).unwrap();
        let encoder = ScalarEncoder::new(params);
        let mut out = vec![u64::MAX; 7];
        let err = encoder.encode_unit::<u8>(&[0b11_10_01_00], 8, &mut out).unwrap_err();
        assert_eq!(err, KmerError::SequenceBoundsExceeded { written: 3, expected: 7 });
        assert_eq!(&out[..3], &[4, 9, 14]);
        assert_eq!(out[3], u64::MAX);
    }

    #[test]
    fn test_seed_without_enough_words() {
        let params = KmerParams::new(6, 2).unwrap();
        let encoder = ScalarEncoder::new(params);
        let mut out = vec![0u64; 3];
        let err = encoder.encode_unit::<u8>(&[0], 8, &mut out).unwrap_err();
        assert_eq!(err, KmerError::SequenceBoundsExceeded { written: 0, expected: 3 });
    }

    #[test]
    fn test_iterator_matches_encoder() {
        let seq = PackedSequence::<u16>::from_bytes(b"GATTACANNACGT", Alphabet::Dna5).unwrap();
        let params = KmerParams::for_alphabet(5, Alphabet::Dna5).unwrap();
        let iter_keys: Vec<u64> = KmerIter::from_sequence(&seq, params).unwrap().collect();
        assert_eq!(iter_keys, ScalarEncoder::new(params).encode_sequence(&seq).unwrap());
        assert_eq!(iter_keys.len(), 9);
    }

    #[test]
    fn test_char_bits_mismatch() {
        let seq = PackedSequence::<u16>::from_bytes(b"ACGT", Alphabet::Dna).unwrap();
        let params = KmerParams::new(2, 3).unwrap();
        assert!(KmerIter::from_sequence(&seq, params).is_err());
    }

    #[test]
    fn test_full_width_key() {
        // 21 three-bit characters fill exactly one 63-bit key.
        let codes: Vec<u8> = (0..30).map(|i| (i % 5) as u8).collect();
        let params = KmerParams::new(21, 3).unwrap();
        assert_eq!(encode_with::<u64>(&codes, params), naive_keys(&codes, params));
        assert_eq!(encode_with::<u16>(&codes, params), naive_keys(&codes, params));
    }

    proptest! {
        #[test]
        fn proptest_matches_naive_reference(
            char_bits in prop::sample::select(vec![2u32, 3, 4]),
            k_fraction in 0.0f64..1.0,
            raw in prop::collection::vec(any::<u8>(), 0..150),
        ) {
            let max_k = (64 / char_bits) as usize;
            let k = 1 + (k_fraction * (max_k - 1) as f64) as usize;
            let params = KmerParams::new(k, char_bits).unwrap();
            let codes: Vec<u8> = raw.iter().map(|&b| b & params.char_mask() as u8).collect();
            let expected = naive_keys(&codes, params);

            prop_assert_eq!(&encode_with::<u8>(&codes, params), &expected);
            prop_assert_eq!(&encode_with::<u16>(&codes, params), &expected);
            prop_assert_eq!(&encode_with::<u32>(&codes, params), &expected);
            prop_assert_eq!(&encode_with::<u64>(&codes, params), &expected);
        }
    }
}
