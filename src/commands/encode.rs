//! Encode a simulated packed corpus into k-mer keys.
//!
//! The command draws a random corpus, lays out one shared key buffer with a
//! prefix sum over per-read key counts and encodes it either with a flat
//! parallel loop or through the demand-driven task runner.

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use kmerpack_dna::PackedWord;
use kmerpack_lib::corpus::{EncodeReport, KeyLayout, encode_bulk, encode_dynamic};
use kmerpack_lib::kmer::{KmerParams, ScalarEncoder};
use kmerpack_lib::logging::{OperationTimer, format_count, log_encode_summary};
use kmerpack_lib::simulate::simulate_corpus;
use kmerpack_lib::taskrunner::RunSummary;
use log::{info, warn};

use crate::commands::command::Command;
use crate::commands::common::{SimulationArgs, ThreadingOptions};

/// How units are scheduled across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EncodeMode {
    /// Flat parallel loop, one item per read
    #[default]
    Bulk,
    /// Chunks of reads submitted as tasks to the dynamic runner
    Dynamic,
}

/// Width of the packed storage word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WordWidth {
    #[value(name = "8")]
    W8,
    #[value(name = "16")]
    W16,
    #[value(name = "32")]
    W32,
    #[value(name = "64")]
    W64,
}

/// Simulates a packed read corpus and encodes every window into a k-mer key.
#[derive(Debug, Parser)]
#[command(
    name = "encode",
    about = "Encode a simulated packed corpus into rolling k-mer keys",
    long_about = r#"
Simulates reads with normally distributed lengths, packs them into words of the
requested width and encodes every length-K window into an integer key.

Keys are written into one buffer laid out by a prefix sum over per-read key
counts (len - K + 1, or 0 for reads shorter than K). In `bulk` mode each read is
one item of a parallel loop; in `dynamic` mode reads are grouped into --chunks
contiguous blocks, each submitted as a task to a runner whose workers pull work
as they become free.

The run logs the number of keys, a checksum over the key buffer, timing and,
for the dynamic mode, how tasks were spread across workers.
"#
)]
pub struct Encode {
    /// Window length K.
    #[arg(short = 'k', long = "k", default_value_t = 15)]
    pub k: usize,

    /// Bits per packed character.
    #[arg(short = 'b', long = "char-bits", default_value_t = 2)]
    pub char_bits: u32,

    /// Width of each packed storage word.
    #[arg(short = 'w', long = "word-bits", value_enum, default_value = "16")]
    pub word_bits: WordWidth,

    /// Scheduling mode.
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = EncodeMode::Bulk)]
    pub mode: EncodeMode,

    /// Number of tasks in dynamic mode (defaults to four per thread).
    #[arg(short = 'c', long = "chunks")]
    pub chunks: Option<usize>,

    #[command(flatten)]
    pub threading: ThreadingOptions,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

impl Command for Encode {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.validate()?;
        info!("Command line: {command_line}");

        let params = KmerParams::new(self.k, self.char_bits)?;
        info!(
            "Encoding {}-mers with {}-bit characters into {}-bit keys",
            params.k(),
            params.char_bits(),
            params.key_bits()
        );
        info!("{}", self.threading.log_message());

        match self.word_bits {
            WordWidth::W8 => self.run::<u8>(params),
            WordWidth::W16 => self.run::<u16>(params),
            WordWidth::W32 => self.run::<u32>(params),
            WordWidth::W64 => self.run::<u64>(params),
        }
    }
}

impl Encode {
    fn validate(&self) -> Result<()> {
        self.threading.validate()?;
        if self.chunks == Some(0) {
            bail!("--chunks must be at least 1");
        }
        let stdev = self.simulation.stdev_len;
        if !(stdev >= 0.0 && stdev.is_finite()) {
            bail!("--stdev-len must be finite and non-negative, got {stdev}");
        }
        if self.simulation.min_len > self.simulation.max_len {
            bail!(
                "--min-len ({}) must not exceed --max-len ({})",
                self.simulation.min_len,
                self.simulation.max_len
            );
        }
        Ok(())
    }

    fn num_chunks(&self) -> usize {
        self.chunks.unwrap_or_else(|| self.threading.num_threads() * 4)
    }

    fn run<W: PackedWord>(&self, params: KmerParams) -> Result<()> {
        params.check_word::<W>()?;
        let encoder = ScalarEncoder::new(params);

        let timer = OperationTimer::new("Simulating corpus");
        let corpus = simulate_corpus::<W>(&self.simulation.to_options(), params.char_bits())?;
        timer.log_completion(corpus.len() as u64);
        info!("Corpus holds {} characters", format_count(corpus.total_len()));

        let layout = KeyLayout::new(corpus.lengths(), params.k());
        let mut keys = layout.allocate();
        let threads = self.threading.num_threads();

        let timer = OperationTimer::new("Encoding keys");
        let (report, summary) = match self.mode {
            EncodeMode::Bulk => {
                (encode_bulk(&encoder, &corpus, &layout, &mut keys, threads)?, None)
            }
            EncodeMode::Dynamic => {
                let (report, summary) = encode_dynamic(
                    &encoder,
                    &corpus,
                    &layout,
                    &mut keys,
                    threads,
                    self.num_chunks(),
                )?;
                (report, Some(summary))
            }
        };
        timer.log_completion(report.keys_written);

        log_encode_summary(&report, summary.as_ref(), timer.elapsed());
        log_outcome(&report, summary.as_ref(), &keys);
        Ok(())
    }
}

/// Wrapping sum of all keys, stable across scheduling modes for a fixed seed.
pub fn key_checksum(keys: &[u64]) -> u64 {
    keys.iter().fold(0u64, |acc, &key| acc.wrapping_add(key))
}

fn log_outcome(report: &EncodeReport, summary: Option<&RunSummary>, keys: &[u64]) {
    info!("Key checksum: {:016x}", key_checksum(keys));
    if let Some(summary) = summary {
        for (worker, count) in summary.per_worker.iter().enumerate() {
            info!("  worker {worker}: {} tasks", format_count(*count));
        }
    }
    if !report.is_complete() {
        warn!("{} reads ran out of packed words before their last key", report.failures.len());
    }
}
