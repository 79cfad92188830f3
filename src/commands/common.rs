//! Common CLI options shared across commands.
//!
//! This module provides shared argument structures that can be composed into
//! command structs using `#[command(flatten)]`.

use std::num::NonZeroUsize;
use std::thread;

use anyhow::{Result, bail};
use clap::Args;
use kmerpack_lib::simulate::SimulationOptions;

/// Worker thread options.
#[derive(Debug, Clone, Default, Args)]
pub struct ThreadingOptions {
    /// Number of worker threads (defaults to the available parallelism).
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,
}

impl ThreadingOptions {
    /// Creates threading options with N threads.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self { threads: Some(threads) }
    }

    /// Returns the number of threads, resolving the default.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }

    /// Rejects an explicit thread count of zero.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            bail!("--threads must be at least 1");
        }
        Ok(())
    }

    /// Returns a log message describing the threading configuration.
    #[must_use]
    pub fn log_message(&self) -> String {
        match self.num_threads() {
            1 => "Single-threaded mode".to_string(),
            n => format!("Using {n} threads"),
        }
    }
}

/// Shape of the simulated read corpus.
#[derive(Debug, Clone, Args)]
pub struct SimulationArgs {
    /// Number of reads to simulate.
    #[arg(short = 'n', long = "reads", default_value_t = 125_000)]
    pub reads: usize,

    /// Mean read length.
    #[arg(long = "mean-len", default_value_t = 100.0)]
    pub mean_len: f64,

    /// Standard deviation of read length.
    #[arg(long = "stdev-len", default_value_t = 7.0)]
    pub stdev_len: f64,

    /// Shortest accepted read length; shorter draws are redrawn.
    #[arg(long = "min-len", default_value_t = 80)]
    pub min_len: usize,

    /// Longest accepted read length; longer draws are redrawn.
    #[arg(long = "max-len", default_value_t = 120)]
    pub max_len: usize,

    /// Random seed for reproducibility.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

impl SimulationArgs {
    /// Library options for these arguments.
    #[must_use]
    pub fn to_options(&self) -> SimulationOptions {
        SimulationOptions {
            reads: self.reads,
            mean_len: self.mean_len,
            stdev_len: self.stdev_len,
            min_len: self.min_len,
            max_len: self.max_len,
            seed: self.seed,
        }
    }
}
