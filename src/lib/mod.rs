#![deny(unsafe_code)]
// Clippy lint configuration for CI
// These lints are allowed because:
// - cast_*: key and offset arithmetic casts between widths whose ranges are checked upstream
// - missing_*_doc: Documentation improvements tracked separately
// - module_name_repetitions: types like `KmerParams` live in `kmer`
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! # kmerpack - rolling k-mer keys over bit-packed sequences
//!
//! This library turns corpora of bit-packed reads into fixed-width integer keys,
//! one per window position, and schedules that work across a thread pool.
//!
//! ## Overview
//!
//! - **[`kmer`]** - Key parameters, the [`kmer::KeyEncoder`] backend trait, the scalar
//!   encoder, and reverse / reverse-complement helpers
//! - **[`corpus`]** - Corpus storage, prefix-sum key layout, bulk and dynamic drivers
//! - **[`taskrunner`]** - Concurrent task queue and the demand-driven runner
//! - **[`simulate`]** - Random corpora with clamped normal read lengths
//! - **[`progress`]** / **[`logging`]** - Progress tracking and summary logging
//!
//! Ranges and partitioning live in the `kmerpack-range` crate; packed words and
//! alphabets in `kmerpack-dna`.
//!
//! ## Quick Start
//!
//! ```
//! use kmerpack_dna::{Alphabet, PackedSequence};
//! use kmerpack_lib::corpus::{Corpus, KeyLayout, encode_bulk};
//! use kmerpack_lib::kmer::{KmerParams, ScalarEncoder};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut corpus = Corpus::<u32>::new();
//! corpus.push(PackedSequence::from_bytes(b"ACGTACGT", Alphabet::Dna)?);
//! corpus.push(PackedSequence::from_bytes(b"GATTACA", Alphabet::Dna)?);
//!
//! let encoder = ScalarEncoder::new(KmerParams::new(4, 2)?);
//! let layout = KeyLayout::new(corpus.lengths(), 4);
//! let mut keys = layout.allocate();
//! let report = encode_bulk(&encoder, &corpus, &layout, &mut keys, 2)?;
//! assert_eq!(report.keys_written, 5 + 4);
//! # Ok(())
//! # }
//! ```

pub mod corpus;
pub mod errors;
pub mod kmer;
pub mod logging;
pub mod progress;
pub mod simulate;
pub mod taskrunner;

pub use errors::{KmerError, Result};
