//! Error types for packing sequences.

use thiserror::Error;

/// Result type alias for packing operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Error type for packing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// Character width outside `1..=8` or wider than the word
    #[error("Invalid character width {char_bits} for {word_bits}-bit words")]
    InvalidCharBits {
        /// Requested bits per character
        char_bits: u32,
        /// Width of the packed word type
        word_bits: u32,
    },

    /// Character code does not fit in the character width
    #[error("Code {code} at position {position} does not fit in {char_bits} bits")]
    InvalidCode {
        /// Position in the sequence
        position: usize,
        /// The offending code
        code: u8,
        /// Bits per character
        char_bits: u32,
    },

    /// Byte is not a base of the alphabet
    #[error("Invalid base '{}' at position {position}", char::from(*.base))]
    InvalidBase {
        /// Position in the sequence
        position: usize,
        /// The offending byte
        base: u8,
    },

    /// Fewer words than the declared length requires
    #[error("Sequence of {len} characters needs {needed} words but only {available} provided")]
    InsufficientWords {
        /// Declared character length
        len: usize,
        /// Words required for `len`
        needed: usize,
        /// Words provided
        available: usize,
    },

    /// Padding bits or slots past the end of the sequence are set
    #[error("Word {word} has non-zero bits outside the sequence")]
    NonZeroPadding {
        /// Index of the offending word
        word: usize,
    },
}
