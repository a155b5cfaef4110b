//! Error types for TPI stream building
//!
//! One enum per protocol phase: finalize, build, commit. Header parsing
//! has its own error for readers of the committed bytes.

use pdbwriter_core::TypeIndex;
use pdbwriter_msf::{MsfError, StreamId};
use thiserror::Error;

/// Errors deriving the stream header from the accumulated records.
///
/// All are fatal to the build and not retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalizeError {
    /// The index range `[begin, begin + count)` does not fit in 32 bits.
    #[error("type index overflow: {count} records starting at {begin}")]
    TypeIndexOverflow {
        /// First index of the stream
        begin: TypeIndex,
        /// Number of records
        count: u64,
    },

    /// Serialized stream does not fit the 32-bit size fields.
    #[error("TPI stream of {length} bytes exceeds the 32-bit stream size limit")]
    StreamTooLarge {
        /// Header plus record bytes
        length: u64,
    },

    /// The builder was mutated after its header was finalized.
    #[error("TPI stream builder is already finalized")]
    Sealed,
}

/// Errors binding a finalized stream to a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Finalizing the header failed.
    #[error("finalize failed: {0}")]
    Finalize(#[from] FinalizeError),

    /// Container has no stream with this id.
    #[error("stream {0} not present in container layout")]
    StreamNotFound(StreamId),

    /// Container reserved fewer bytes than the stream needs.
    #[error("stream {stream} reserves {available} bytes, {required} required")]
    StreamTooSmall {
        /// Target stream
        stream: StreamId,
        /// Serialized length of the TPI stream
        required: u64,
        /// Bytes the container reserved
        available: u64,
    },

    /// Destination is smaller than the blocks assigned to the stream.
    #[error("destination holds {available} bytes, stream blocks end at {required}")]
    DestinationTooSmall {
        /// End of the last block backing the stream
        required: u64,
        /// Destination length
        available: u64,
    },
}

/// Errors writing the finalized stream into a destination.
#[derive(Debug, Error)]
pub enum CommitError {
    /// `commit` called before a successful `finalize`.
    #[error("TPI stream must be finalized before commit")]
    NotFinalized,

    /// Layout capacity differs from the serialized length.
    #[error("layout provides {actual} bytes, TPI stream requires {expected}")]
    LayoutMismatch {
        /// `calculate_serialized_length()`
        expected: u64,
        /// Capacity of the layout
        actual: u64,
    },

    /// Destination reported a write failure.
    #[error("TPI stream write failed: {0}")]
    WriteFailed(#[from] MsfError),
}

/// Errors parsing a serialized TPI header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Data too short to contain the header.
    #[error("TPI header too short: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Header size
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Version field is not a known TPI version.
    #[error("unknown TPI version: {0}")]
    UnknownVersion(u32),

    /// `header_size` field is not 56.
    #[error("invalid TPI header size: {0}")]
    InvalidHeaderSize(u32),

    /// End index precedes begin index.
    #[error("invalid type index range [{begin}, {end})")]
    InvalidIndexRange {
        /// First index
        begin: TypeIndex,
        /// One past the last index
        end: TypeIndex,
    },
}
