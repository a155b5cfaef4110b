//! Builder protocol tests
//!
//! These tests verify the size-then-place handshake:
//! - Serialized length is header size plus record bytes at every step
//! - Finalize derives the index range from the record count
//! - Finalize is idempotent and seals the builder

mod common;

use common::{filled, init_tracing, nth_index};
use pdbwriter_core::{LeafKind, TpiVersion, TypeIndex, TypeRecord, FIRST_NON_SIMPLE_INDEX};
use pdbwriter_msf::{MemoryBuffer, MsfLayout, StreamId};
use pdbwriter_tpi::{BuildError, BuilderState, FinalizeError, TpiStreamBuilder, TPI_HEADER_SIZE};
use proptest::prelude::*;

const HEADER: u64 = TPI_HEADER_SIZE as u64;

#[test]
fn test_empty_builder_scenario() {
    init_tracing();
    let mut builder = TpiStreamBuilder::new();
    assert_eq!(builder.calculate_serialized_length(), HEADER);

    builder.finalize().unwrap();
    let header = builder.header().unwrap();
    assert_eq!(header.type_index_begin, header.type_index_end);
    assert_eq!(header.type_index_begin.0, FIRST_NON_SIMPLE_INDEX);
    assert_eq!(builder.calculate_serialized_length(), HEADER);
}

#[test]
fn test_lengths_10_0_25_scenario() {
    let mut builder = TpiStreamBuilder::new();
    for len in [10, 0, 25] {
        builder.add_type_record(filled(len, 0x5A)).unwrap();
    }
    assert_eq!(builder.calculate_serialized_length(), HEADER + 35);

    builder.finalize().unwrap();
    let header = builder.header().unwrap();
    assert_eq!(header.type_index_end, nth_index(3));
    assert_eq!(header.type_index_end.0, header.type_index_begin.0 + 3);
    assert_eq!(header.type_record_bytes, 35);
}

#[test]
fn test_indices_assigned_in_append_order() {
    let mut builder = TpiStreamBuilder::new();
    let indices: Vec<TypeIndex> = (0..5)
        .map(|i| builder.add_type_record(filled(4, i as u8)).unwrap())
        .collect();
    assert_eq!(indices, (0..5).map(nth_index).collect::<Vec<_>>());
    assert!(indices.iter().all(|index| !index.is_simple()));
}

#[test]
fn test_version_can_be_set_after_records() {
    let mut builder = TpiStreamBuilder::new();
    builder.add_type_record(filled(8, 1)).unwrap();
    builder.set_version(TpiVersion::V70).unwrap();
    builder.finalize().unwrap();
    assert_eq!(builder.header().unwrap().version, TpiVersion::V70);
}

#[test]
fn test_sealed_after_finalize_keeps_header_consistent() {
    let mut builder = TpiStreamBuilder::new();
    builder.add_type_record(filled(12, 1)).unwrap();
    builder.finalize().unwrap();
    let before = builder.calculate_serialized_length();

    assert_eq!(
        builder.add_type_record(filled(12, 2)),
        Err(FinalizeError::Sealed)
    );
    assert_eq!(builder.calculate_serialized_length(), before);
    assert_eq!(
        u64::from(builder.header().unwrap().type_record_bytes) + HEADER,
        before
    );
    assert_eq!(builder.state(), BuilderState::Finalized);
}

#[test]
fn test_bulk_add_reports_count() {
    let mut builder = TpiStreamBuilder::new();
    let added = builder
        .add_type_records((0..10).map(|i| filled(4 * i, 0)))
        .unwrap();
    assert_eq!(added, 10);
    assert_eq!(builder.num_type_records(), 10);
    assert_eq!(builder.calculate_serialized_length(), HEADER + 180);
}

#[test]
fn test_payload_over_32_bits_fails_finalize_and_build() {
    // Clones share one 64 MiB buffer; 64 of them total 4 GiB of payload
    let big = TypeRecord::new(LeafKind::FIELDLIST, vec![0u8; 64 << 20]);
    let mut builder = TpiStreamBuilder::new();
    builder
        .add_type_records(std::iter::repeat(big).take(64))
        .unwrap();
    let expected_length = HEADER + (64u64 << 26);
    assert_eq!(builder.calculate_serialized_length(), expected_length);

    assert_eq!(
        builder.finalize(),
        Err(FinalizeError::StreamTooLarge {
            length: expected_length
        })
    );
    assert_eq!(builder.state(), BuilderState::Accumulating);
    assert!(builder.header().is_none());

    let container = MsfLayout {
        block_size: 4096,
        block_count: 3,
        streams: Vec::new(),
    };
    let dest = MemoryBuffer::with_len(0);
    let err = builder.build(&container, StreamId(0), &dest).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Finalize(FinalizeError::StreamTooLarge { .. })
    ));
    assert_eq!(builder.state(), BuilderState::Accumulating);
}

proptest! {
    #[test]
    fn prop_length_is_header_plus_records(lengths in prop::collection::vec(0usize..300, 0..40)) {
        let mut builder = TpiStreamBuilder::new();
        let mut expected = HEADER;
        let mut previous = builder.calculate_serialized_length();
        prop_assert_eq!(previous, expected);

        for &len in &lengths {
            builder.add_type_record(filled(len, 0xEE)).unwrap();
            expected += len as u64;
            let current = builder.calculate_serialized_length();
            prop_assert_eq!(current, expected);
            prop_assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn prop_finalize_range_matches_count(lengths in prop::collection::vec(0usize..64, 0..64)) {
        let mut builder = TpiStreamBuilder::new();
        builder.add_type_records(lengths.iter().map(|&len| filled(len, 1))).unwrap();
        builder.finalize().unwrap();
        let first = builder.header().unwrap().clone();
        builder.finalize().unwrap();
        let second = builder.header().unwrap().clone();

        prop_assert_eq!(first.type_index_begin.0, FIRST_NON_SIMPLE_INDEX);
        prop_assert_eq!(
            (first.type_index_end.0 - first.type_index_begin.0) as usize,
            lengths.len()
        );
        prop_assert_eq!(first.to_bytes(), second.to_bytes());
        prop_assert_eq!(
            u64::from(first.type_record_bytes) + HEADER,
            builder.calculate_serialized_length()
        );
    }
}
