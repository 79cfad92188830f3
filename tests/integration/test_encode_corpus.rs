//! End-to-end encoding of simulated corpora through both scheduling paths.

use kmerpack_dna::{Alphabet, PackedSequence, PackedWord};
use kmerpack_lib::KmerError;
use kmerpack_lib::corpus::{Corpus, KeyLayout, UnitFailure, encode_bulk, encode_dynamic};
use kmerpack_lib::kmer::{KeyEncoder, KmerParams, ScalarEncoder, canonical_key, reverse_complement_key};
use rstest::rstest;

use crate::helpers::{layout_for, reference_buffer, seeded_corpus};

fn check_bulk_matches_reference<W: PackedWord>(k: usize, char_bits: u32) {
    let corpus = seeded_corpus::<W>(300, 40.0, char_bits, 11);
    let encoder = ScalarEncoder::new(KmerParams::new(k, char_bits).unwrap());
    let (layout, mut keys) = layout_for(&corpus, k);

    let report = encode_bulk(&encoder, &corpus, &layout, &mut keys, 4).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.units, 300);
    assert_eq!(report.keys_written, layout.total());
    assert_eq!(keys, reference_buffer(&corpus, k, char_bits));
}

#[rstest]
#[case(1, 2)]
#[case(7, 2)]
#[case(31, 2)]
#[case(5, 3)]
#[case(16, 4)]
fn test_bulk_matches_reference_u16(#[case] k: usize, #[case] char_bits: u32) {
    check_bulk_matches_reference::<u16>(k, char_bits);
}

#[rstest]
#[case(4, 2)]
#[case(21, 3)]
fn test_bulk_matches_reference_other_words(#[case] k: usize, #[case] char_bits: u32) {
    check_bulk_matches_reference::<u8>(k, char_bits);
    check_bulk_matches_reference::<u32>(k, char_bits);
    check_bulk_matches_reference::<u64>(k, char_bits);
}

#[rstest]
#[case(1, 1)]
#[case(2, 3)]
#[case(4, 1)]
#[case(8, 64)]
fn test_dynamic_matches_bulk(#[case] threads: usize, #[case] chunks: usize) {
    let corpus = seeded_corpus::<u32>(500, 60.0, 2, 3);
    let encoder = ScalarEncoder::new(KmerParams::new(12, 2).unwrap());

    let (layout, mut bulk_keys) = layout_for(&corpus, 12);
    let bulk = encode_bulk(&encoder, &corpus, &layout, &mut bulk_keys, threads).unwrap();

    let mut dynamic_keys = layout.allocate();
    let (dynamic, summary) =
        encode_dynamic(&encoder, &corpus, &layout, &mut dynamic_keys, threads, chunks).unwrap();

    assert_eq!(dynamic, bulk);
    assert_eq!(dynamic_keys, bulk_keys);
    assert_eq!(summary.total, chunks as u64);
    assert_eq!(summary.per_worker.len(), threads);
    assert_eq!(summary.panicked, 0);
}

#[test]
fn test_short_units_produce_no_keys() {
    let mut corpus = Corpus::<u16>::new();
    for seq in [&b"AC"[..], b"", b"ACGTAC", b"ACG"] {
        corpus.push(PackedSequence::from_bytes(seq, Alphabet::Dna).unwrap());
    }
    let encoder = ScalarEncoder::new(KmerParams::new(3, 2).unwrap());
    let (layout, mut keys) = layout_for(&corpus, 3);

    assert_eq!(layout.offsets(), &[0, 0, 0, 4, 5]);
    let report = encode_bulk(&encoder, &corpus, &layout, &mut keys, 2).unwrap();
    assert_eq!(report.keys_written, 5);
    assert_eq!(keys, reference_buffer(&corpus, 3, 2));
}

#[test]
fn test_truncated_units_are_reported_not_fatal() {
    // Unit 1 claims 12 characters but only carries one u8 word (4 characters).
    let words = vec![vec![0b1110_0100u8, 0b0001_1011], vec![0b1110_0100], vec![0b0000_0011]];
    let corpus = Corpus::from_parts(vec![8, 12, 4], words).unwrap();
    let encoder = ScalarEncoder::new(KmerParams::new(2, 2).unwrap());
    let (layout, mut keys) = layout_for(&corpus, 2);

    let report = encode_bulk(&encoder, &corpus, &layout, &mut keys, 2).unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    let UnitFailure { unit, written, expected } = report.failures[0];
    assert_eq!((unit, expected), (1, 11));
    assert!(written < expected);

    // Neighbouring units are untouched by the failure.
    let unit0 = layout.unit_span(0).unwrap();
    let unit2 = layout.unit_span(2).unwrap();
    assert_eq!(&keys[unit0.start() as usize..unit0.end() as usize], &[4, 9, 14, 15, 11, 6, 1]);
    assert_eq!(&keys[unit2.start() as usize..unit2.end() as usize], &[3, 0, 0]);

    let mut dynamic_keys = layout.allocate();
    let (dynamic, _) = encode_dynamic(&encoder, &corpus, &layout, &mut dynamic_keys, 2, 3).unwrap();
    assert_eq!(dynamic, report);
}

#[test]
fn test_mismatched_layout_is_rejected() {
    let corpus = seeded_corpus::<u16>(10, 30.0, 2, 5);
    let encoder = ScalarEncoder::new(KmerParams::new(5, 2).unwrap());
    let layout = KeyLayout::new(corpus.lengths(), 6);
    let mut keys = layout.allocate();
    assert!(matches!(
        encode_bulk(&encoder, &corpus, &layout, &mut keys, 2),
        Err(KmerError::InvalidParameter { .. })
    ));
}

#[test]
fn test_canonical_keys_are_strand_independent() {
    let forward = PackedSequence::<u32>::from_bytes(b"ACGGTTCAGT", Alphabet::Dna).unwrap();
    let reverse = PackedSequence::<u32>::from_bytes(b"ACTGAACCGT", Alphabet::Dna).unwrap();
    let params = KmerParams::for_alphabet(4, Alphabet::Dna).unwrap();
    let encoder = ScalarEncoder::new(params);

    let canonical = |seq: &PackedSequence<u32>| -> Vec<u64> {
        let mut keys: Vec<u64> = encoder
            .encode_sequence(seq)
            .unwrap()
            .into_iter()
            .map(|key| canonical_key(key, params, Alphabet::Dna).unwrap())
            .collect();
        keys.sort_unstable();
        keys
    };
    assert_eq!(canonical(&forward), canonical(&reverse));

    let first = encoder.encode_sequence(&forward).unwrap()[0];
    let last = *encoder.encode_sequence(&reverse).unwrap().last().unwrap();
    assert_eq!(reverse_complement_key(first, params, Alphabet::Dna).unwrap(), last);
    assert_eq!(encoder.name(), "scalar");
}
