//! Handle to a finalized TPI stream inside a container.

use crate::header::TpiStreamHeader;
use pdbwriter_core::TypeIndex;
use pdbwriter_msf::StreamId;
use std::ops::Range;
use std::sync::Arc;

/// A finalized TPI header bound to a container stream.
///
/// Cheap to clone; shares the header with the builder that produced it.
/// Container directory construction reads the stream's final length and
/// index range from here instead of re-deriving them.
#[derive(Debug, Clone)]
pub struct TpiStream {
    header: Arc<TpiStreamHeader>,
    stream_id: StreamId,
    block_size: u32,
    serialized_length: u64,
}

impl TpiStream {
    pub(crate) fn new(
        header: Arc<TpiStreamHeader>,
        stream_id: StreamId,
        block_size: u32,
        serialized_length: u64,
    ) -> Self {
        TpiStream {
            header,
            stream_id,
            block_size,
            serialized_length,
        }
    }

    /// The finalized header.
    pub fn header(&self) -> &TpiStreamHeader {
        &self.header
    }

    /// Container stream this TPI stream is written to.
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Block size of the container.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Header plus record bytes.
    pub fn serialized_length(&self) -> u64 {
        self.serialized_length
    }

    /// Index of the first record.
    pub fn type_index_begin(&self) -> TypeIndex {
        self.header.type_index_begin
    }

    /// One past the index of the last record.
    pub fn type_index_end(&self) -> TypeIndex {
        self.header.type_index_end
    }

    /// Number of records in the stream.
    pub fn num_type_records(&self) -> u32 {
        self.header.num_type_records()
    }

    /// Bytes of record data after the header.
    pub fn type_record_bytes(&self) -> u32 {
        self.header.type_record_bytes
    }

    /// Raw index range covered by the stream's records.
    pub fn type_index_range(&self) -> Range<u32> {
        self.header.type_index_begin.0..self.header.type_index_end.0
    }

    /// Returns `true` if `index` names a record in this stream.
    pub fn contains(&self, index: TypeIndex) -> bool {
        self.type_index_range().contains(&index.0)
    }
}
