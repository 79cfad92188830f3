//! Corpus builders and a naive reference encoder.

use kmerpack_dna::{PackedSequence, PackedWord};
use kmerpack_lib::corpus::{Corpus, KeyLayout};
use kmerpack_lib::simulate::{SimulationOptions, simulate_corpus};

/// Simulate a small seeded corpus with lengths spread around `mean_len`.
pub fn seeded_corpus<W: PackedWord>(reads: usize, mean_len: f64, char_bits: u32, seed: u64) -> Corpus<W> {
    let options = SimulationOptions {
        reads,
        mean_len,
        stdev_len: mean_len / 4.0,
        min_len: 0,
        max_len: (mean_len * 2.0) as usize,
        seed: Some(seed),
    };
    simulate_corpus::<W>(&options, char_bits).expect("simulation should succeed")
}

/// Keys of `codes` computed character by character, first character in the low bits.
pub fn reference_keys(codes: &[u8], k: usize, char_bits: u32) -> Vec<u64> {
    if codes.len() < k {
        return Vec::new();
    }
    codes
        .windows(k)
        .map(|window| {
            window
                .iter()
                .enumerate()
                .fold(0u64, |key, (j, &code)| key | (u64::from(code) << (j as u32 * char_bits)))
        })
        .collect()
}

/// Reference key buffer for a whole corpus, in layout order.
pub fn reference_buffer<W: PackedWord>(corpus: &Corpus<W>, k: usize, char_bits: u32) -> Vec<u64> {
    (0..corpus.len())
        .flat_map(|unit| {
            let (words, len) = corpus.unit(unit).expect("unit in range");
            let seq = PackedSequence::from_words(words.to_vec(), len, char_bits)
                .expect("simulated words are well formed");
            reference_keys(&seq.unpack(), k, char_bits)
        })
        .collect()
}

/// Layout and zeroed buffer for `corpus`.
pub fn layout_for<W: PackedWord>(corpus: &Corpus<W>, k: usize) -> (KeyLayout, Vec<u64>) {
    let layout = KeyLayout::new(corpus.lengths(), k);
    let keys = layout.allocate();
    (layout, keys)
}
