//! Shared helpers for TPI integration tests

#![allow(dead_code)]

use pdbwriter_core::{LeafKind, TypeIndex, TypeRecord};
use pdbwriter_tpi::{TpiStreamHeader, TPI_HEADER_SIZE};

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Record of `len` bytes all set to `fill`.
pub fn filled(len: usize, fill: u8) -> TypeRecord {
    TypeRecord::new(LeafKind::STRUCTURE, vec![fill; len])
}

/// Stream contents recovered from committed bytes.
pub struct ParsedStream {
    pub header: TpiStreamHeader,
    pub records: Vec<Vec<u8>>,
}

/// Re-parse a committed TPI stream using the known record lengths.
pub fn parse_stream(bytes: &[u8], lengths: &[usize]) -> ParsedStream {
    let header = TpiStreamHeader::from_bytes(bytes).expect("valid header");
    let mut offset = TPI_HEADER_SIZE;
    let mut records = Vec::with_capacity(lengths.len());
    for &len in lengths {
        records.push(bytes[offset..offset + len].to_vec());
        offset += len;
    }
    assert_eq!(
        offset - TPI_HEADER_SIZE,
        header.type_record_bytes as usize,
        "record lengths must cover the payload exactly"
    );
    ParsedStream { header, records }
}

/// Gather a stream's logical bytes out of a block-addressed file image.
pub fn read_stream(file: &[u8], block_size: u32, blocks: &[u32], length: usize) -> Vec<u8> {
    let block_size = block_size as usize;
    let mut out = Vec::with_capacity(length);
    for &block in blocks {
        let start = block as usize * block_size;
        let take = block_size.min(length - out.len());
        out.extend_from_slice(&file[start..start + take]);
    }
    out
}

/// Index of the `n`th record in any TPI stream.
pub fn nth_index(n: u32) -> TypeIndex {
    TypeIndex(0x1000 + n)
}
