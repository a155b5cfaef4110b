//! TPI stream builder.
//!
//! The builder follows a strict size-then-place protocol:
//!
//! 1. Records are appended; each receives the next [`TypeIndex`].
//! 2. [`TpiStreamBuilder::calculate_serialized_length`] reports the exact
//!    byte count so the container can reserve blocks.
//! 3. [`TpiStreamBuilder::finalize`] derives the header and seals the
//!    record list.
//! 4. [`TpiStreamBuilder::commit`] writes header and records through the
//!    layout the container assigned.
//!
//! # States
//!
//! ```text
//! Accumulating --finalize--> Finalized --commit--> Committed
//!                                 ^                    |
//!                                 +------commit--------+
//! ```
//!
//! Appending or changing the version after `finalize` fails with
//! [`FinalizeError::Sealed`]. `commit` may be repeated; each call writes
//! identical bytes.

use crate::error::{BuildError, CommitError, FinalizeError};
use crate::header::{TpiStreamHeader, TPI_HEADER_SIZE};
use crate::stream::TpiStream;
use pdbwriter_core::{TpiVersion, TypeIndex, TypeRecord};
use pdbwriter_msf::{
    MappedBlockStream, MsfLayout, SequencedItemStream, StreamId, StreamLayout, WritableStream,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle position of a [`TpiStreamBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// Records and version may still change.
    Accumulating,
    /// Header derived; record list sealed.
    Finalized,
    /// At least one commit succeeded.
    Committed,
}

/// Accumulates type records and writes the TPI stream.
///
/// The finalized header is shared through an `Arc`, so [`TpiStream`]
/// handles produced by [`TpiStreamBuilder::build`] stay valid after the
/// builder is dropped.
///
/// Not safe for concurrent mutation; use one builder per stream from a
/// single producer.
#[derive(Debug)]
pub struct TpiStreamBuilder {
    version: Option<TpiVersion>,
    records: Vec<TypeRecord>,
    header: Option<Arc<TpiStreamHeader>>,
    state: BuilderState,
}

impl Default for TpiStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TpiStreamBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        TpiStreamBuilder {
            version: None,
            records: Vec::new(),
            header: None,
            state: BuilderState::Accumulating,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Version to stamp into the header. Last call wins.
    pub fn set_version(&mut self, version: TpiVersion) -> Result<(), FinalizeError> {
        self.ensure_accumulating()?;
        self.version = Some(version);
        Ok(())
    }

    /// Version explicitly requested, if any.
    pub fn version(&self) -> Option<TpiVersion> {
        self.version
    }

    /// Append a record and return the index it will carry.
    pub fn add_type_record(&mut self, record: TypeRecord) -> Result<TypeIndex, FinalizeError> {
        self.ensure_accumulating()?;
        let index = self.next_type_index()?;
        self.records.push(record);
        Ok(index)
    }

    /// Append every record from `records`, in order.
    ///
    /// Returns the number appended. On error, records before the failing
    /// one remain appended.
    pub fn add_type_records<I>(&mut self, records: I) -> Result<usize, FinalizeError>
    where
        I: IntoIterator<Item = TypeRecord>,
    {
        let before = self.records.len();
        for record in records {
            self.add_type_record(record)?;
        }
        let added = self.records.len() - before;
        debug!(target: "pdbwriter::tpi", added, total = self.records.len(), "Appended type records");
        Ok(added)
    }

    /// Number of records appended so far.
    pub fn num_type_records(&self) -> usize {
        self.records.len()
    }

    /// Records appended so far, in index order.
    pub fn type_records(&self) -> &[TypeRecord] {
        &self.records
    }

    /// Lazy concatenation view over the records.
    pub fn record_stream(&self) -> SequencedItemStream<'_, TypeRecord> {
        SequencedItemStream::new(&self.records)
    }

    /// The finalized header, if `finalize` has succeeded.
    pub fn header(&self) -> Option<&TpiStreamHeader> {
        self.header.as_deref()
    }

    /// Exact byte length of the serialized stream: header plus records.
    ///
    /// Valid at any time; never needs a container or destination.
    pub fn calculate_serialized_length(&self) -> u64 {
        TPI_HEADER_SIZE as u64 + self.record_stream().total_length()
    }

    /// Derive the header from the accumulated records and seal the builder.
    ///
    /// Idempotent: a second call returns the same header.
    pub fn finalize(&mut self) -> Result<(), FinalizeError> {
        self.finalized_header().map(|_| ())
    }

    fn finalized_header(&mut self) -> Result<Arc<TpiStreamHeader>, FinalizeError> {
        if let Some(header) = &self.header {
            return Ok(Arc::clone(header));
        }

        let begin = TypeIndex::FIRST_NON_SIMPLE;
        let count = self.records.len() as u64;
        let end = u32::try_from(count)
            .ok()
            .and_then(|count| begin.checked_add(count))
            .ok_or(FinalizeError::TypeIndexOverflow { begin, count })?;

        let length = self.calculate_serialized_length();
        if length > u64::from(u32::MAX) {
            return Err(FinalizeError::StreamTooLarge { length });
        }
        let record_bytes = (length - TPI_HEADER_SIZE as u64) as u32;

        let version = self.version.unwrap_or_default();
        let header = TpiStreamHeader::new(version, begin, end, record_bytes);

        debug!(
            target: "pdbwriter::tpi",
            ?version,
            begin = %begin,
            end = %end,
            record_bytes,
            "Finalized TPI stream header"
        );

        let header = Arc::new(header);
        self.header = Some(Arc::clone(&header));
        self.state = BuilderState::Finalized;
        Ok(header)
    }

    /// Finalize if needed and bind the header to a container stream.
    ///
    /// Fails early when the container reserved too little space for
    /// `stream`, or when `destination` is too small to hold its blocks.
    pub fn build<W: WritableStream + ?Sized>(
        &mut self,
        container: &MsfLayout,
        stream: StreamId,
        destination: &W,
    ) -> Result<TpiStream, BuildError> {
        let header = self.finalized_header()?;

        let layout = container
            .stream(stream)
            .ok_or(BuildError::StreamNotFound(stream))?;

        let required = self.calculate_serialized_length();
        if layout.capacity() < required {
            return Err(BuildError::StreamTooSmall {
                stream,
                required,
                available: layout.capacity(),
            });
        }

        let physical_end = layout.physical_end();
        if destination.len() < physical_end {
            return Err(BuildError::DestinationTooSmall {
                required: physical_end,
                available: destination.len(),
            });
        }

        Ok(TpiStream::new(header, stream, container.block_size, required))
    }

    /// Write header then records through `layout` into `destination`.
    ///
    /// `layout` must provide exactly `calculate_serialized_length()` bytes;
    /// this is checked before anything is written. A write failure aborts
    /// the remaining writes and leaves the destination region invalid.
    pub fn commit<W: WritableStream + ?Sized>(
        &mut self,
        layout: &StreamLayout,
        destination: &mut W,
    ) -> Result<(), CommitError> {
        let header = match (self.state, &self.header) {
            (BuilderState::Finalized | BuilderState::Committed, Some(header)) => Arc::clone(header),
            _ => return Err(CommitError::NotFinalized),
        };

        let expected = self.calculate_serialized_length();
        if layout.capacity() != expected {
            warn!(
                target: "pdbwriter::tpi",
                expected,
                actual = layout.capacity(),
                "TPI layout does not match serialized length"
            );
            return Err(CommitError::LayoutMismatch {
                expected,
                actual: layout.capacity(),
            });
        }

        debug!(
            target: "pdbwriter::tpi",
            length = expected,
            blocks = layout.blocks().len(),
            records = self.records.len(),
            "Committing TPI stream"
        );

        let mut stream = MappedBlockStream::new(layout, destination);
        let written = stream
            .write_bytes(0, &header.to_bytes())
            .and_then(|()| {
                self.record_stream()
                    .write_to(&mut stream, TPI_HEADER_SIZE as u64)
            })
            .map_err(|e| {
                warn!(target: "pdbwriter::tpi", error = %e, "TPI stream write failed");
                CommitError::WriteFailed(e)
            })?;
        debug_assert_eq!(written, expected);
        debug!(target: "pdbwriter::tpi", written, "Committed TPI stream");

        self.state = BuilderState::Committed;
        Ok(())
    }

    fn ensure_accumulating(&self) -> Result<(), FinalizeError> {
        match self.state {
            BuilderState::Accumulating => Ok(()),
            BuilderState::Finalized | BuilderState::Committed => Err(FinalizeError::Sealed),
        }
    }

    fn next_type_index(&self) -> Result<TypeIndex, FinalizeError> {
        type_index_at(self.records.len() as u64)
    }
}

/// Index of the record at position `position`.
///
/// Fails unless the end index after that record (`begin + position + 1`)
/// still fits, so every accepted record can be finalized.
fn type_index_at(position: u64) -> Result<TypeIndex, FinalizeError> {
    let begin = TypeIndex::FIRST_NON_SIMPLE;
    let count = position + 1;
    u32::try_from(count)
        .ok()
        .and_then(|count| begin.checked_add(count))
        .map(|end| TypeIndex(end.0 - 1))
        .ok_or(FinalizeError::TypeIndexOverflow { begin, count })
}
