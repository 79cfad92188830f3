//! Seeded random number generators for reproducible corpora.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Create a random number generator, seeded when `seed` is given and from OS
/// entropy otherwise.
///
/// ```
/// use kmerpack_lib::simulate::create_rng;
/// use rand::Rng;
///
/// let a: u64 = create_rng(Some(7)).random();
/// let b: u64 = create_rng(Some(7)).random();
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}
