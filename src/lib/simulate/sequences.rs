//! Random packed words and whole simulated corpora.

use kmerpack_dna::{PackedWord, bit_mask, chars_per_word, validate_char_bits, words_needed};
use log::debug;
use rand::Rng;

use crate::corpus::Corpus;
use crate::errors::Result;
use crate::simulate::{ReadLengthModel, SimulationOptions, create_rng};

/// Random packed words for a unit of `len` characters.
///
/// Every slot gets random bits, so for widths that do not fill a power of two the
/// codes are not restricted to an alphabet. Padding bits and the slots after the
/// last character are zero.
pub fn simulate_packed_words<W: PackedWord>(
    len: usize,
    char_bits: u32,
    rng: &mut impl Rng,
) -> Result<Vec<W>> {
    validate_char_bits::<W>(char_bits)?;
    let per_word = chars_per_word::<W>(char_bits);
    let significant = bit_mask(per_word as u32 * char_bits);

    let mut words: Vec<W> = (0..words_needed::<W>(len, char_bits))
        .map(|_| W::from_u64(rng.random::<u64>() & significant))
        .collect();

    let tail = len % per_word;
    if tail > 0 {
        if let Some(last) = words.last_mut() {
            *last = W::from_u64(last.to_u64() & bit_mask(tail as u32 * char_bits));
        }
    }
    Ok(words)
}

/// Draw `options.reads` unit lengths from the clamped normal model.
pub fn simulate_lengths(options: &SimulationOptions, rng: &mut impl Rng) -> Result<Vec<usize>> {
    ReadLengthModel::new(options.mean_len, options.stdev_len, options.min_len, options.max_len)
        .sample_n(options.reads, rng)
}

/// Simulate a corpus of `options.reads` units of random packed characters.
pub fn simulate_corpus<W: PackedWord>(
    options: &SimulationOptions,
    char_bits: u32,
) -> Result<Corpus<W>> {
    let mut rng = create_rng(options.seed);
    let lengths = simulate_lengths(options, &mut rng)?;
    let words = lengths
        .iter()
        .map(|&len| simulate_packed_words::<W>(len, char_bits, &mut rng))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "Simulated {} units of {}-bit words with {char_bits}-bit characters",
        lengths.len(),
        W::BITS
    );
    Corpus::from_parts(lengths, words)
}
