//! TPI stream header format.
//!
//! # Binary Format (56 bytes, little-endian)
//!
//! ```text
//! version(4) + header_size(4) + type_index_begin(4) + type_index_end(4)
//! + type_record_bytes(4) + hash_stream_index(2) + hash_aux_stream_index(2)
//! + hash_key_size(4) + num_hash_buckets(4)
//! + hash_value_buffer(8) + index_offset_buffer(8) + hash_adj_buffer(8)
//! ```
//!
//! The hash fields describe a companion hash stream. This crate does not
//! build one, so they always carry the "no hash stream" sentinels.

use crate::error::HeaderError;
use byteorder::{ByteOrder, LittleEndian};
use pdbwriter_core::{TpiVersion, TypeIndex, TPI_HASH_KEY_SIZE, TPI_MAX_HASH_BUCKETS};
use pdbwriter_msf::StreamId;
use serde::{Deserialize, Serialize};

/// Total size of a serialized [`TpiStreamHeader`] in bytes.
pub const TPI_HEADER_SIZE: usize = 56;

/// Offset/length pair locating a sub-buffer inside the hash stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedBuf {
    /// Offset into the hash stream.
    pub offset: i32,
    /// Length in bytes.
    pub length: u32,
}

/// Fixed-size header at the start of the TPI stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpiStreamHeader {
    /// Format version tag.
    pub version: TpiVersion,
    /// Size of this header; always [`TPI_HEADER_SIZE`].
    pub header_size: u32,
    /// Index of the first record.
    pub type_index_begin: TypeIndex,
    /// One past the index of the last record.
    pub type_index_end: TypeIndex,
    /// Bytes of record data following the header.
    pub type_record_bytes: u32,
    /// Stream holding the type hash table, or `StreamId::INVALID`.
    pub hash_stream_index: StreamId,
    /// Auxiliary hash stream, or `StreamId::INVALID`.
    pub hash_aux_stream_index: StreamId,
    /// Width of one hash value.
    pub hash_key_size: u32,
    /// Number of hash buckets.
    pub num_hash_buckets: u32,
    /// Hash values of each record.
    pub hash_value_buffer: EmbeddedBuf,
    /// Index-offset pairs for random access.
    pub index_offset_buffer: EmbeddedBuf,
    /// Hash adjustment table.
    pub hash_adj_buffer: EmbeddedBuf,
}

impl TpiStreamHeader {
    /// Header for records `[begin, end)` totalling `type_record_bytes`,
    /// with no companion hash stream.
    pub fn new(
        version: TpiVersion,
        type_index_begin: TypeIndex,
        type_index_end: TypeIndex,
        type_record_bytes: u32,
    ) -> Self {
        TpiStreamHeader {
            version,
            header_size: TPI_HEADER_SIZE as u32,
            type_index_begin,
            type_index_end,
            type_record_bytes,
            hash_stream_index: StreamId::INVALID,
            hash_aux_stream_index: StreamId::INVALID,
            hash_key_size: TPI_HASH_KEY_SIZE,
            num_hash_buckets: TPI_MAX_HASH_BUCKETS - 1,
            hash_value_buffer: EmbeddedBuf::default(),
            index_offset_buffer: EmbeddedBuf::default(),
            hash_adj_buffer: EmbeddedBuf::default(),
        }
    }

    /// Number of records covered by the index range.
    pub fn num_type_records(&self) -> u32 {
        self.type_index_end.0.saturating_sub(self.type_index_begin.0)
    }

    /// Serialize to the 56-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; TPI_HEADER_SIZE] {
        let mut bytes = [0u8; TPI_HEADER_SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.version.as_u32());
        LittleEndian::write_u32(&mut bytes[4..8], self.header_size);
        LittleEndian::write_u32(&mut bytes[8..12], self.type_index_begin.0);
        LittleEndian::write_u32(&mut bytes[12..16], self.type_index_end.0);
        LittleEndian::write_u32(&mut bytes[16..20], self.type_record_bytes);
        LittleEndian::write_u16(&mut bytes[20..22], self.hash_stream_index.0);
        LittleEndian::write_u16(&mut bytes[22..24], self.hash_aux_stream_index.0);
        LittleEndian::write_u32(&mut bytes[24..28], self.hash_key_size);
        LittleEndian::write_u32(&mut bytes[28..32], self.num_hash_buckets);

        let embedded = [
            self.hash_value_buffer,
            self.index_offset_buffer,
            self.hash_adj_buffer,
        ];
        for (i, buf) in embedded.iter().enumerate() {
            let at = 32 + i * 8;
            LittleEndian::write_i32(&mut bytes[at..at + 4], buf.offset);
            LittleEndian::write_u32(&mut bytes[at + 4..at + 8], buf.length);
        }

        bytes
    }

    /// Deserialize from bytes, validating header size, version, and index
    /// range.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() < TPI_HEADER_SIZE {
            return Err(HeaderError::TooShort {
                expected: TPI_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let raw_version = LittleEndian::read_u32(&data[0..4]);
        let version =
            TpiVersion::from_u32(raw_version).ok_or(HeaderError::UnknownVersion(raw_version))?;

        let header_size = LittleEndian::read_u32(&data[4..8]);
        if header_size as usize != TPI_HEADER_SIZE {
            return Err(HeaderError::InvalidHeaderSize(header_size));
        }

        let type_index_begin = TypeIndex(LittleEndian::read_u32(&data[8..12]));
        let type_index_end = TypeIndex(LittleEndian::read_u32(&data[12..16]));
        if type_index_end < type_index_begin {
            return Err(HeaderError::InvalidIndexRange {
                begin: type_index_begin,
                end: type_index_end,
            });
        }

        let embedded = |i: usize| {
            let at = 32 + i * 8;
            EmbeddedBuf {
                offset: LittleEndian::read_i32(&data[at..at + 4]),
                length: LittleEndian::read_u32(&data[at + 4..at + 8]),
            }
        };

        Ok(TpiStreamHeader {
            version,
            header_size,
            type_index_begin,
            type_index_end,
            type_record_bytes: LittleEndian::read_u32(&data[16..20]),
            hash_stream_index: StreamId(LittleEndian::read_u16(&data[20..22])),
            hash_aux_stream_index: StreamId(LittleEndian::read_u16(&data[22..24])),
            hash_key_size: LittleEndian::read_u32(&data[24..28]),
            num_hash_buckets: LittleEndian::read_u32(&data[28..32]),
            hash_value_buffer: embedded(0),
            index_offset_buffer: embedded(1),
            hash_adj_buffer: embedded(2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TpiStreamHeader {
        TpiStreamHeader::new(
            TpiVersion::V80,
            TypeIndex(0x1000),
            TypeIndex(0x1003),
            35,
        )
    }

    #[test]
    fn test_new_uses_hash_sentinels() {
        let header = sample();
        assert_eq!(header.header_size, 56);
        assert_eq!(header.hash_stream_index, StreamId::INVALID);
        assert_eq!(header.hash_aux_stream_index, StreamId::INVALID);
        assert_eq!(header.hash_key_size, 4);
        assert_eq!(header.num_hash_buckets, 0x3FFFF);
        assert_eq!(header.hash_value_buffer, EmbeddedBuf::default());
        assert_eq!(header.num_type_records(), 3);
    }

    #[test]
    fn test_byte_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), TPI_HEADER_SIZE);
        assert_eq!(&bytes[0..4], &20040203u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &56u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0x1000u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0x1003u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &35u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[24..28], &4u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &0x3FFFFu32.to_le_bytes());
        assert_eq!(&bytes[32..56], &[0u8; 24]);
    }

    #[test]
    fn test_roundtrip() {
        let mut header = sample();
        header.hash_adj_buffer = EmbeddedBuf {
            offset: -8,
            length: 16,
        };
        let decoded = TpiStreamHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_from_bytes_too_short() {
        let err = TpiStreamHeader::from_bytes(&[0u8; 20]).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::TooShort {
                expected: 56,
                actual: 20
            }
        ));
    }

    #[test]
    fn test_from_bytes_unknown_version() {
        let mut bytes = sample().to_bytes();
        bytes[0..4].copy_from_slice(&99u32.to_le_bytes());
        let err = TpiStreamHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::UnknownVersion(99)));
    }

    #[test]
    fn test_from_bytes_bad_header_size() {
        let mut bytes = sample().to_bytes();
        bytes[4..8].copy_from_slice(&64u32.to_le_bytes());
        let err = TpiStreamHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidHeaderSize(64)));
    }

    #[test]
    fn test_from_bytes_inverted_range() {
        let mut bytes = sample().to_bytes();
        bytes[12..16].copy_from_slice(&0x0FFFu32.to_le_bytes());
        let err = TpiStreamHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidIndexRange { .. }));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["version"], "V80");
        assert_eq!(json["type_index_begin"], 4096);
        assert_eq!(json["hash_stream_index"], 65535);
    }
}
