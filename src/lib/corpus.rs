//! Corpus storage, key buffer layout, and the bulk and demand-driven encoders.
//!
//! A [`Corpus`] holds the packed words and character lengths of every unit. A
//! [`KeyLayout`] assigns each unit a contiguous span of one shared key buffer via
//! a prefix sum over per-unit key counts, so units can be encoded in any order and
//! on any thread without locking the buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use kmerpack_dna::{PackedSequence, PackedWord};
use kmerpack_range::{Range, block_partition};
use log::{debug, info};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::errors::{KmerError, Result};
use crate::kmer::KeyEncoder;
use crate::progress::ProgressTracker;
use crate::taskrunner::{DynamicRunner, RunSummary, Runner};

/// Keys produced by a unit of `len` characters: `len - k + 1`, or 0 if `len < k`.
#[inline]
#[must_use]
pub const fn key_count(len: usize, k: usize) -> usize {
    if len >= k { len - k + 1 } else { 0 }
}

/// Exclusive prefix sums of per-unit key counts.
///
/// The result has `lengths.len() + 1` entries; unit `i` owns
/// `offsets[i]..offsets[i + 1]` and the last entry is the total.
///
/// ```
/// use kmerpack_lib::corpus::prefix_sum_key_counts;
///
/// assert_eq!(prefix_sum_key_counts(&[10, 5, 2], 3), vec![0, 8, 11, 11]);
/// ```
#[must_use]
pub fn prefix_sum_key_counts(lengths: &[usize], k: usize) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(lengths.len() + 1);
    let mut total = 0u64;
    offsets.push(total);
    for &len in lengths {
        total += key_count(len, k) as u64;
        offsets.push(total);
    }
    offsets
}

/// Placement of every unit's keys in one shared buffer.
///
/// Unit `i` owns the half-open key span `offsets[i]..offsets[i + 1]`. Spans of
/// distinct units never overlap, so [`encode_bulk`] and [`encode_dynamic`] can
/// hand each worker a disjoint mutable slice of the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    k: usize,
    offsets: Vec<u64>,
}

impl KeyLayout {
    /// Lay out the keys of units with the given lengths for windows of `k`.
    ///
    /// # Arguments
    /// * `lengths` - Character length of each unit, in corpus order
    /// * `k` - Window length; units shorter than `k` get an empty span
    ///
    /// # Returns
    /// A layout whose [`KeyLayout::total`] is the sum of all per-unit key counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use kmerpack_lib::corpus::KeyLayout;
    ///
    /// let layout = KeyLayout::new(&[10, 5, 2], 3);
    /// assert_eq!(layout.units(), 3);
    /// assert_eq!(layout.total(), 11);
    /// assert_eq!(layout.allocate().len(), 11);
    /// ```
    #[must_use]
    pub fn new(lengths: &[usize], k: usize) -> Self {
        Self { k, offsets: prefix_sum_key_counts(lengths, k) }
    }

    /// Window length the layout was computed for.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Prefix-sum offsets, one more than the number of units.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Number of units.
    pub fn units(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of keys.
    pub fn total(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Key span of one unit.
    ///
    /// # Errors
    /// Returns [`KmerError::InvalidParameter`] if `unit` is not less than
    /// [`KeyLayout::units`].
    ///
    /// # Examples
    ///
    /// ```
    /// use kmerpack_lib::corpus::KeyLayout;
    ///
    /// let layout = KeyLayout::new(&[10, 5, 2], 3);
    /// let span = layout.unit_span(1).unwrap();
    /// assert_eq!((span.start(), span.end()), (8, 11));
    /// assert!(layout.unit_span(2).unwrap().is_empty());
    /// assert!(layout.unit_span(3).is_err());
    /// ```
    pub fn unit_span(&self, unit: usize) -> Result<Range<u64>> {
        if unit >= self.units() {
            return Err(KmerError::invalid_parameter(
                "unit",
                format!("{unit} is out of bounds for {} units", self.units()),
            ));
        }
        Ok(Range::new(self.offsets[unit], self.offsets[unit + 1])?)
    }

    /// Key span covering a contiguous range of units.
    pub fn chunk_span(&self, units: &Range<usize>) -> Result<Range<u64>> {
        if units.end() > self.units() {
            return Err(KmerError::invalid_parameter(
                "units",
                format!("{units} is out of bounds for {} units", self.units()),
            ));
        }
        Ok(Range::new(self.offsets[units.start()], self.offsets[units.end()])?)
    }

    /// A zeroed key buffer of exactly [`KeyLayout::total`] slots.
    #[must_use]
    pub fn allocate(&self) -> Vec<u64> {
        vec![0; self.total() as usize]
    }

    /// Split `keys` into one disjoint mutable slice per unit in `units`.
    fn split_units<'k>(&self, keys: &'k mut [u64], units: &Range<usize>) -> Vec<&'k mut [u64]> {
        let mut rest = keys;
        let mut slices = Vec::with_capacity(units.size() as usize);
        for unit in units.start()..units.end() {
            let len = (self.offsets[unit + 1] - self.offsets[unit]) as usize;
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            slices.push(head);
            rest = tail;
        }
        slices
    }
}

/// Packed units with their character lengths, stored as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus<W: PackedWord> {
    lengths: Vec<usize>,
    words: Vec<Vec<W>>,
}

impl<W: PackedWord> Corpus<W> {
    /// An empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self { lengths: Vec::new(), words: Vec::new() }
    }

    /// Build from parallel arrays of lengths and packed words.
    ///
    /// Lengths are trusted as given. A unit whose words hold fewer characters than
    /// its length is accepted here and reported as a [`UnitFailure`] when encoded.
    ///
    /// # Arguments
    /// * `lengths` - Character length of each unit
    /// * `words` - Packed words of each unit, lowest character in the low bits
    ///
    /// # Errors
    /// Returns [`KmerError::InvalidParameter`] if the two arrays differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use kmerpack_lib::corpus::Corpus;
    ///
    /// let corpus = Corpus::<u8>::from_parts(vec![4, 2], vec![vec![0b1110_0100], vec![0b0011]]).unwrap();
    /// assert_eq!(corpus.len(), 2);
    /// assert_eq!(corpus.total_len(), 6);
    /// assert!(Corpus::<u8>::from_parts(vec![4], vec![]).is_err());
    /// ```
    pub fn from_parts(lengths: Vec<usize>, words: Vec<Vec<W>>) -> Result<Self> {
        if lengths.len() != words.len() {
            return Err(KmerError::invalid_parameter(
                "words",
                format!("{} word vectors for {} lengths", words.len(), lengths.len()),
            ));
        }
        Ok(Self { lengths, words })
    }

    /// Append a packed sequence as a new unit.
    pub fn push(&mut self, seq: PackedSequence<W>) {
        self.lengths.push(seq.len());
        self.words.push(seq.into_words());
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// True if the corpus has no units.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Character length of every unit.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Packed words and character length of one unit, or `None` past the end.
    pub fn unit(&self, index: usize) -> Option<(&[W], usize)> {
        Some((self.words.get(index)?.as_slice(), *self.lengths.get(index)?))
    }

    /// Total number of characters.
    pub fn total_len(&self) -> u64 {
        self.lengths.iter().map(|&len| len as u64).sum()
    }
}

/// A unit whose words ran out before all of its keys were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitFailure {
    /// Index of the unit.
    pub unit: usize,
    /// Keys written before the failure.
    pub written: usize,
    /// Keys the unit should have produced.
    pub expected: usize,
}

/// Outcome of encoding a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Units processed.
    pub units: usize,
    /// Keys written across all units.
    pub keys_written: u64,
    /// Units that stopped early, sorted by unit index.
    pub failures: Vec<UnitFailure>,
}

impl EncodeReport {
    /// True if every unit produced all of its keys.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of encoding a single unit, with bounds violations kept as data.
fn encode_one<E: KeyEncoder, W: PackedWord>(
    encoder: &E,
    corpus: &Corpus<W>,
    unit: usize,
    out: &mut [u64],
) -> Result<(usize, Option<UnitFailure>)> {
    let (words, len) = corpus.unit(unit).ok_or_else(|| {
        KmerError::invalid_parameter("unit", format!("{unit} is not in the corpus"))
    })?;
    match encoder.encode_unit(words, len, out) {
        Ok(written) => Ok((written, None)),
        Err(KmerError::SequenceBoundsExceeded { written, expected }) => {
            Ok((written, Some(UnitFailure { unit, written, expected })))
        }
        Err(e) => Err(e),
    }
}

fn check_inputs<E: KeyEncoder, W: PackedWord>(
    encoder: &E,
    corpus: &Corpus<W>,
    layout: &KeyLayout,
    keys: &[u64],
) -> Result<()> {
    if layout.k() != encoder.params().k() {
        return Err(KmerError::invalid_parameter(
            "layout",
            format!("laid out for k={} but encoder uses k={}", layout.k(), encoder.params().k()),
        ));
    }
    if layout.units() != corpus.len() {
        return Err(KmerError::invalid_parameter(
            "layout",
            format!("laid out for {} units but corpus has {}", layout.units(), corpus.len()),
        ));
    }
    if keys.len() as u64 != layout.total() {
        return Err(KmerError::invalid_parameter(
            "keys",
            format!("buffer has {} slots but layout needs {}", keys.len(), layout.total()),
        ));
    }
    Ok(())
}

fn progress_tracker(units: usize) -> ProgressTracker {
    ProgressTracker::new("Encoded units").with_interval((units as u64 / 10).max(10_000))
}

/// Encode every unit with a flat parallel loop over a pool of `threads` workers.
///
/// Each unit writes into its own disjoint slice of `keys`. Units whose words run
/// out are recorded in the report rather than aborting the batch.
///
/// # Errors
///
/// - [`KmerError::InvalidParameter`] if the layout does not match the encoder,
///   corpus or buffer
/// - [`KmerError::SchedulerUnavailable`] if `threads` is zero or the pool cannot be built
pub fn encode_bulk<E: KeyEncoder, W: PackedWord>(
    encoder: &E,
    corpus: &Corpus<W>,
    layout: &KeyLayout,
    keys: &mut [u64],
    threads: usize,
) -> Result<EncodeReport> {
    check_inputs(encoder, corpus, layout, keys)?;
    // rayon reads zero as "pick a default", so it is rejected here.
    if threads == 0 {
        return Err(KmerError::SchedulerUnavailable {
            reason: "at least one worker thread is required".to_string(),
        });
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| KmerError::SchedulerUnavailable { reason: e.to_string() })?;

    let all_units = Range::new(0, corpus.len())?;
    let slices = layout.split_units(keys, &all_units);
    let progress = progress_tracker(corpus.len());
    debug!("Bulk encoding {} units with the {} encoder", corpus.len(), encoder.name());

    let outcomes: Vec<(usize, Option<UnitFailure>)> = pool.install(|| {
        slices
            .into_par_iter()
            .enumerate()
            .map(|(unit, out)| {
                let outcome = encode_one(encoder, corpus, unit, out);
                progress.log_if_needed(1);
                outcome
            })
            .collect::<Result<Vec<_>>>()
    })?;
    progress.log_final();

    let mut report = EncodeReport { units: corpus.len(), ..EncodeReport::default() };
    for (written, failure) in outcomes {
        report.keys_written += written as u64;
        report.failures.extend(failure);
    }
    Ok(report)
}

/// Encode the units of `chunk` into `out`, which covers exactly that chunk's keys.
fn encode_chunk<E: KeyEncoder, W: PackedWord>(
    encoder: &E,
    corpus: &Corpus<W>,
    layout: &KeyLayout,
    chunk: &Range<usize>,
    out: &mut [u64],
) -> Result<(u64, Vec<UnitFailure>)> {
    let mut written = 0u64;
    let mut failures = Vec::new();
    let slices = layout.split_units(out, chunk);
    for (unit, slice) in (chunk.start()..chunk.end()).zip(slices) {
        let (count, failure) = encode_one(encoder, corpus, unit, slice)?;
        written += count as u64;
        failures.extend(failure);
    }
    Ok((written, failures))
}

/// Encode the corpus through a [`DynamicRunner`].
///
/// Units are split into `chunks` contiguous blocks; a producer thread submits one
/// task per block while the calling thread runs the scheduler, so workers pick up
/// blocks as they become free.
///
/// # Errors
///
/// - [`KmerError::InvalidParameter`] if the layout does not match the encoder,
///   corpus or buffer
/// - [`KmerError::Range`] if `chunks` is zero
/// - [`KmerError::SchedulerUnavailable`] if `threads` is zero or the pool cannot be built
pub fn encode_dynamic<E: KeyEncoder, W: PackedWord>(
    encoder: &E,
    corpus: &Corpus<W>,
    layout: &KeyLayout,
    keys: &mut [u64],
    threads: usize,
    chunks: usize,
) -> Result<(EncodeReport, RunSummary)> {
    check_inputs(encoder, corpus, layout, keys)?;
    let blocks = block_partition(&Range::new(0, corpus.len())?, chunks, 0)?;

    let mut outputs = Vec::with_capacity(blocks.len());
    let mut rest = keys;
    for block in &blocks {
        let len = layout.chunk_span(block)?.size() as usize;
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        outputs.push(head);
        rest = tail;
    }

    let written = AtomicU64::new(0);
    let failures: Mutex<Vec<UnitFailure>> = Mutex::new(Vec::new());
    let first_error: Mutex<Option<KmerError>> = Mutex::new(None);
    let progress = progress_tracker(corpus.len());
    let runner = DynamicRunner::new(threads)?;
    debug!(
        "Dynamic encoding {} units in {} chunks on {threads} workers with the {} encoder",
        corpus.len(),
        blocks.len(),
        encoder.name()
    );

    let summary = thread::scope(|s| {
        s.spawn(|| {
            for (block, out) in blocks.iter().zip(outputs) {
                let (written, failures, first_error, progress) =
                    (&written, &failures, &first_error, &progress);
                let submitted = runner.add(move || {
                    match encode_chunk(encoder, corpus, layout, block, out) {
                        Ok((count, chunk_failures)) => {
                            written.fetch_add(count, Ordering::Relaxed);
                            failures.lock().extend(chunk_failures);
                        }
                        Err(e) => {
                            first_error.lock().get_or_insert(e);
                        }
                    }
                    progress.log_if_needed(block.size());
                });
                if !submitted {
                    break;
                }
            }
            runner.disable_add();
        });
        runner.run()
    });
    drop(runner);
    progress.log_final();

    if let Some(e) = first_error.into_inner() {
        return Err(e);
    }
    let mut failures = failures.into_inner();
    failures.sort_unstable_by_key(|f| f.unit);
    let report =
        EncodeReport { units: corpus.len(), keys_written: written.into_inner(), failures };
    info!("Encoded {} units in {} chunks", report.units, blocks.len());
    Ok((report, summary))
}
