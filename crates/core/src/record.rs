//! Opaque type records
//!
//! A [`TypeRecord`] is one already-encoded CodeView type description. The
//! stream builder never looks inside the bytes: it only needs the length
//! and the exact byte sequence to write. The bytes are shared (`Arc<[u8]>`)
//! so cloning a record never copies its payload.
//!
//! # Serialized CodeView layout
//!
//! ```text
//! ┌──────────────────┬───────────────┬──────────────────────────────┐
//! │ record_len (u16) │ kind (u16)    │ body (record_len - 2 bytes)  │
//! └──────────────────┴───────────────┴──────────────────────────────┘
//! ```
//!
//! `record_len` counts every byte after itself. Bodies are padded to a
//! 4-byte boundary with `LF_PADn` filler (`0xF3 0xF2 0xF1`), where each
//! filler byte encodes how many padding bytes remain.

use crate::limits::{MAX_RECORD_LENGTH, RECORD_PREFIX_SIZE};
use crate::types::LeafKind;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;
use thiserror::Error;

/// An immutable, already-encoded type record.
///
/// `len()` is fixed at construction and equals `bytes().len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    kind: LeafKind,
    data: Arc<[u8]>,
}

impl TypeRecord {
    /// Wrap caller-supplied bytes verbatim.
    ///
    /// `data` is written to the stream exactly as given; no validation of
    /// its contents is performed.
    pub fn new(kind: LeafKind, data: impl Into<Arc<[u8]>>) -> Self {
        TypeRecord {
            kind,
            data: data.into(),
        }
    }

    /// Wrap a fully serialized CodeView record, reading the kind from its
    /// prefix.
    ///
    /// Validates that the 16-bit length prefix matches the buffer size.
    pub fn from_raw(data: impl Into<Arc<[u8]>>) -> Result<Self, RecordError> {
        let data: Arc<[u8]> = data.into();
        if data.len() < RECORD_PREFIX_SIZE {
            return Err(RecordError::TooShort {
                expected: RECORD_PREFIX_SIZE,
                actual: data.len(),
            });
        }

        let record_len = LittleEndian::read_u16(&data[0..2]) as usize;
        if record_len > MAX_RECORD_LENGTH {
            return Err(RecordError::TooLarge {
                len: record_len,
                max: MAX_RECORD_LENGTH,
            });
        }
        if record_len + 2 != data.len() {
            return Err(RecordError::LengthMismatch {
                prefix: record_len,
                actual: data.len() - 2,
            });
        }

        let kind = LeafKind(LittleEndian::read_u16(&data[2..4]));
        Ok(TypeRecord { kind, data })
    }

    /// Serialize `body` as a CodeView record of the given kind.
    ///
    /// Emits the length prefix and kind, then the body followed by
    /// `LF_PADn` filler up to a 4-byte boundary.
    pub fn encode(kind: LeafKind, body: &[u8]) -> Result<Self, RecordError> {
        let padding = (4 - (RECORD_PREFIX_SIZE + body.len()) % 4) % 4;
        let total = RECORD_PREFIX_SIZE + body.len() + padding;
        let record_len = total - 2;
        if record_len > MAX_RECORD_LENGTH {
            return Err(RecordError::TooLarge {
                len: record_len,
                max: MAX_RECORD_LENGTH,
            });
        }

        let mut buf = vec![0u8; RECORD_PREFIX_SIZE];
        LittleEndian::write_u16(&mut buf[0..2], record_len as u16);
        LittleEndian::write_u16(&mut buf[2..4], kind.as_u16());
        buf.extend_from_slice(body);
        buf.extend_from_slice(&[0xF3, 0xF2, 0xF1][3 - padding..]);

        Ok(TypeRecord {
            kind,
            data: buf.into(),
        })
    }

    /// Leaf kind of this record.
    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Number of bytes this record occupies in the stream.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the record carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The exact bytes written for this record.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Errors from constructing a [`TypeRecord`] out of serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Buffer too short to hold the length and kind prefix.
    #[error("type record too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Length prefix disagrees with the buffer size.
    #[error("type record length prefix {prefix} does not match {actual} trailing bytes")]
    LengthMismatch {
        /// Value of the length prefix
        prefix: usize,
        /// Bytes actually present after the length field
        actual: usize,
    },

    /// Record exceeds the 16-bit length prefix limit.
    #[error("type record length {len} exceeds maximum {max}")]
    TooLarge {
        /// Prefix-counted length
        len: usize,
        /// Maximum allowed
        max: usize,
    },
}
