//! Nucleotide alphabets and their character codes.

/// Nucleotide alphabet used to map bases to character codes.
///
/// Concrete bases share codes across alphabets: A=0, C=1, G=2, T=3, so the
/// complement of a concrete base is always `3 - code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alphabet {
    /// `ACGT` in 2 bits. `U` is read as `T`.
    #[default]
    Dna,
    /// `ACGTN` in 3 bits, N=4.
    Dna5,
}

impl Alphabet {
    /// Bits per character.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Dna => 2,
            Self::Dna5 => 3,
        }
    }

    /// Number of distinct codes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Dna => 4,
            Self::Dna5 => 5,
        }
    }

    /// Map a base byte (either case) to its code.
    #[inline]
    #[must_use]
    pub const fn encode(self, base: u8) -> Option<u8> {
        match (self, base) {
            (_, b'A' | b'a') => Some(0),
            (_, b'C' | b'c') => Some(1),
            (_, b'G' | b'g') => Some(2),
            (_, b'T' | b't') | (Self::Dna, b'U' | b'u') => Some(3),
            (Self::Dna5, b'N' | b'n') => Some(4),
            _ => None,
        }
    }

    /// Map a code back to an upper-case base.
    #[inline]
    #[must_use]
    pub const fn decode(self, code: u8) -> Option<u8> {
        match (self, code) {
            (_, 0) => Some(b'A'),
            (_, 1) => Some(b'C'),
            (_, 2) => Some(b'G'),
            (_, 3) => Some(b'T'),
            (Self::Dna5, 4) => Some(b'N'),
            _ => None,
        }
    }

    /// Complement of a code; `N` complements to itself.
    #[inline]
    #[must_use]
    pub const fn complement(self, code: u8) -> Option<u8> {
        match (self, code) {
            (_, 0..=3) => Some(3 - code),
            (Self::Dna5, 4) => Some(4),
            _ => None,
        }
    }
}
