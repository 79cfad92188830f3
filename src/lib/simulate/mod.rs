//! Simulation of packed read corpora for benchmarking the encoders.
//!
//! # Modules
//!
//! - [`rng`] - Seeded random number generator utilities
//! - [`read_length`] - Clamped normal read length model
//! - [`sequences`] - Random packed words and corpora

pub mod read_length;
pub mod rng;
pub mod sequences;

pub use read_length::ReadLengthModel;
pub use rng::create_rng;
pub use sequences::{simulate_corpus, simulate_lengths, simulate_packed_words};

/// Shape of a simulated corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Number of reads
    pub reads: usize,
    /// Mean read length
    pub mean_len: f64,
    /// Standard deviation of read length
    pub stdev_len: f64,
    /// Shortest accepted read length
    pub min_len: usize,
    /// Longest accepted read length
    pub max_len: usize,
    /// Seed for reproducible corpora; OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self { reads: 125_000, mean_len: 100.0, stdev_len: 7.0, min_len: 80, max_len: 120, seed: None }
    }
}
