//! Key reversal, reverse complement and canonical keys.

use kmerpack_dna::Alphabet;

use crate::errors::{KmerError, Result};
use crate::kmer::KmerParams;

/// Reverse the order of the `K` characters of `key`.
#[must_use]
pub fn reverse_key(key: u64, params: KmerParams) -> u64 {
    let bits = params.char_bits();
    let mask = params.char_mask();
    let mut rest = key;
    let mut reversed = 0u64;
    for _ in 0..params.k() {
        reversed = (reversed << bits) | (rest & mask);
        rest >>= bits;
    }
    reversed
}

/// Reverse complement of `key` under `alphabet`.
///
/// For the 2-bit alphabet this is the reversed key with every bit flipped.
///
/// # Errors
///
/// Returns [`KmerError::InvalidParameter`] if the key width does not match the
/// alphabet or a character code is outside the alphabet.
pub fn reverse_complement_key(key: u64, params: KmerParams, alphabet: Alphabet) -> Result<u64> {
    if params.char_bits() != alphabet.bits() {
        return Err(KmerError::invalid_parameter(
            "alphabet",
            format!(
                "{alphabet:?} uses {} bits per character but keys use {}",
                alphabet.bits(),
                params.char_bits()
            ),
        ));
    }
    if alphabet == Alphabet::Dna {
        return Ok(reverse_key(key, params) ^ params.key_mask());
    }

    let bits = params.char_bits();
    let mask = params.char_mask();
    let mut rest = key;
    let mut result = 0u64;
    for _ in 0..params.k() {
        let code = (rest & mask) as u8;
        let complement = alphabet.complement(code).ok_or_else(|| {
            KmerError::invalid_parameter("key", format!("code {code} is not in {alphabet:?}"))
        })?;
        result = (result << bits) | u64::from(complement);
        rest >>= bits;
    }
    Ok(result)
}

/// The smaller of `key` and its reverse complement.
///
/// # Errors
///
/// See [`reverse_complement_key`].
pub fn canonical_key(key: u64, params: KmerParams, alphabet: Alphabet) -> Result<u64> {
    Ok(key.min(reverse_complement_key(key, params, alphabet)?))
}
