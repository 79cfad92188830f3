#![deny(unsafe_code)]

//! Bit-packed nucleotide sequences.
//!
//! This crate provides the storage layer for k-mer key encoding:
//! - Packed word types (`u8`, `u16`, `u32`, `u64`) holding fixed-width characters
//! - 2-bit (`ACGT`) and 3-bit (`ACGTN`) alphabets with complement
//! - [`PackedSequence`], an owned packed character stream with zero padding
//!
//! Characters are packed from the least significant bit: the first character of a
//! sequence occupies the lowest slot of the first word.
//!
//! # Example
//!
//! ```
//! use kmerpack_dna::{Alphabet, PackedSequence};
//!
//! let seq = PackedSequence::<u16>::from_bytes(b"ACGT", Alphabet::Dna).unwrap();
//! assert_eq!(seq.words(), &[0b11_10_01_00]);
//! assert_eq!(seq.to_bytes(Alphabet::Dna), b"ACGT".to_vec());
//! ```

pub mod alphabet;
pub mod errors;
pub mod packed;
pub mod word;

pub use alphabet::Alphabet;
pub use errors::{PackError, Result};
pub use packed::PackedSequence;
pub use word::{PackedWord, bit_mask, chars_per_word, validate_char_bits, words_needed};

/// Widest character supported by the packed layout.
pub const MAX_CHAR_BITS: u32 = 8;
