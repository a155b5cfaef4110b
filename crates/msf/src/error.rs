//! Container error types

use crate::config::MsfConfigError;
use crate::layout::StreamId;
use std::io;
use thiserror::Error;

/// Errors raised by container layout and destination writes.
#[derive(Debug, Error)]
pub enum MsfError {
    /// I/O error from a file-backed destination.
    #[error("MSF I/O error: {0}")]
    Io(#[from] io::Error),

    /// Write would run past the end of the destination or stream.
    #[error("write of {len} bytes at offset {offset} exceeds capacity {capacity}")]
    OutOfBounds {
        /// Write offset
        offset: u64,
        /// Write length
        len: usize,
        /// Capacity of the target
        capacity: u64,
    },

    /// Layout uses a block size the format does not allow.
    #[error("invalid layout: {0}")]
    Config(#[from] MsfConfigError),

    /// Block list does not cover the stream length.
    #[error("stream of {length} bytes needs {expected} blocks of {block_size}, layout has {actual}")]
    InvalidLayout {
        /// Stream length in bytes
        length: u32,
        /// Block size in bytes
        block_size: u32,
        /// Blocks required
        expected: usize,
        /// Blocks listed
        actual: usize,
    },

    /// Stream length does not fit the 32-bit stream size field.
    #[error("stream length {0} exceeds the 32-bit stream size limit")]
    StreamTooLarge(u64),

    /// Block address space or stream directory exhausted.
    #[error("container exhausted: cannot allocate {requested} more blocks")]
    OutOfBlocks {
        /// Blocks requested by the failing reservation
        requested: u64,
    },

    /// Stream directory is full.
    #[error("stream directory full")]
    TooManyStreams,

    /// Stream id is not present in the layout.
    #[error("stream {0} not found")]
    StreamNotFound(StreamId),
}
