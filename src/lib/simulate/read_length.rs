//! Read length distribution for simulated corpora.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::{KmerError, Result};

/// Draws after which a sample outside `[min, max]` is clamped instead of redrawn.
const MAX_REJECTIONS: usize = 1_000;

/// Normally distributed read lengths, redrawn until they fall in `[min, max]`.
///
/// # Examples
///
/// ```
/// use kmerpack_lib::simulate::{ReadLengthModel, create_rng};
///
/// let model = ReadLengthModel::default();
/// let mut rng = create_rng(Some(42));
/// let lengths = model.sample_n(1000, &mut rng).unwrap();
/// assert!(lengths.iter().all(|&l| (80..=120).contains(&l)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReadLengthModel {
    /// Mean read length
    pub mean: f64,
    /// Standard deviation of read length
    pub stddev: f64,
    /// Shortest accepted length
    pub min: usize,
    /// Longest accepted length
    pub max: usize,
}

impl Default for ReadLengthModel {
    fn default() -> Self {
        Self { mean: 100.0, stddev: 7.0, min: 80, max: 120 }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl ReadLengthModel {
    /// Create a model with custom parameters.
    #[must_use]
    pub fn new(mean: f64, stddev: f64, min: usize, max: usize) -> Self {
        Self { mean, stddev, min, max }
    }

    fn distribution(&self) -> Result<Normal<f64>> {
        if self.min > self.max {
            return Err(KmerError::invalid_parameter(
                "min-len",
                format!("{} is greater than max-len {}", self.min, self.max),
            ));
        }
        if !(self.stddev >= 0.0 && self.stddev.is_finite()) {
            return Err(KmerError::invalid_parameter(
                "stdev-len",
                format!("{} must be finite and non-negative", self.stddev),
            ));
        }
        Normal::new(self.mean, self.stddev)
            .map_err(|e| KmerError::invalid_parameter("stdev-len", e.to_string()))
    }

    fn draw(&self, dist: &Normal<f64>, rng: &mut impl Rng) -> usize {
        let mut value = dist.sample(rng).round();
        for _ in 0..MAX_REJECTIONS {
            if value >= self.min as f64 && value <= self.max as f64 {
                return value as usize;
            }
            value = dist.sample(rng).round();
        }
        (value.max(0.0) as usize).clamp(self.min, self.max)
    }

    /// Sample one length.
    pub fn sample(&self, rng: &mut impl Rng) -> Result<usize> {
        let dist = self.distribution()?;
        Ok(self.draw(&dist, rng))
    }

    /// Sample `count` lengths.
    pub fn sample_n(&self, count: usize, rng: &mut impl Rng) -> Result<Vec<usize>> {
        let dist = self.distribution()?;
        Ok((0..count).map(|_| self.draw(&dist, rng)).collect())
    }
}
