//! Block layout of an MSF container.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Block 0: superblock                │
//! ├────────────────────────────────────┤
//! │ Blocks 1-2: free page maps         │
//! ├────────────────────────────────────┤
//! │ Block 3..: stream data             │
//! └────────────────────────────────────┘
//! ```
//!
//! A stream is a logical byte sequence backed by an ordered list of
//! blocks. Blocks need not be contiguous; the last one may be partially
//! used. The [`BlockAllocator`] here is deliberately minimal: it hands
//! out fresh blocks in order and never frees or reuses them.

use crate::config::{MsfConfig, MsfConfigError};
use crate::error::MsfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Blocks at the start of the file that never hold stream data.
pub const RESERVED_BLOCKS: u32 = 3;

/// Index of a stream in the container's stream directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub u16);

impl StreamId {
    /// Sentinel meaning "no stream".
    pub const INVALID: StreamId = StreamId(0xFFFF);

    /// Raw 16-bit value.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns `true` unless this is the [`StreamId::INVALID`] sentinel.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of `block_size` blocks needed to hold `length` bytes.
///
/// `block_size` must be non-zero; callers validate it first.
pub(crate) fn blocks_for(length: u64, block_size: u32) -> u64 {
    let block_size = u64::from(block_size);
    length / block_size + u64::from(length % block_size != 0)
}

/// Where one logical stream lives inside the container.
///
/// `length` is the exact byte count reserved for the stream; `blocks`
/// lists, in stream order, the block numbers backing it.
///
/// Deserialization runs the same checks as [`StreamLayout::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStreamLayout")]
pub struct StreamLayout {
    block_size: u32,
    length: u32,
    blocks: Vec<u32>,
}

#[derive(Deserialize)]
struct RawStreamLayout {
    block_size: u32,
    length: u32,
    blocks: Vec<u32>,
}

impl TryFrom<RawStreamLayout> for StreamLayout {
    type Error = MsfError;

    fn try_from(raw: RawStreamLayout) -> Result<Self, Self::Error> {
        StreamLayout::new(raw.block_size, raw.length, raw.blocks)
    }
}

impl StreamLayout {
    /// Create a layout, checking the block size and that `blocks` exactly
    /// covers `length`.
    pub fn new(block_size: u32, length: u32, blocks: Vec<u32>) -> Result<Self, MsfError> {
        MsfConfig::new().with_block_size(block_size).validate()?;
        let expected = blocks_for(u64::from(length), block_size) as usize;
        if blocks.len() != expected {
            return Err(MsfError::InvalidLayout {
                length,
                block_size,
                expected,
                actual: blocks.len(),
            });
        }
        Ok(StreamLayout {
            block_size,
            length,
            blocks,
        })
    }

    /// Layout over consecutive blocks starting at `first_block`.
    pub fn contiguous(block_size: u32, first_block: u32, length: u32) -> Result<Self, MsfError> {
        MsfConfig::new().with_block_size(block_size).validate()?;
        let count = blocks_for(u64::from(length), block_size);
        let end = u64::from(first_block) + count;
        if end > u64::from(u32::MAX) {
            return Err(MsfError::OutOfBlocks { requested: count });
        }
        let blocks = (first_block..end as u32).collect();
        Self::new(block_size, length, blocks)
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Reserved stream length in bytes.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Bytes this layout can hold.
    pub fn capacity(&self) -> u64 {
        u64::from(self.length)
    }

    /// Block numbers backing the stream, in order.
    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    /// Smallest file size that contains every block of this stream.
    pub fn physical_end(&self) -> u64 {
        self.blocks
            .iter()
            .max()
            .map(|&b| (u64::from(b) + 1) * u64::from(self.block_size))
            .unwrap_or(0)
    }

    /// Translate a logical stream offset to a file offset.
    ///
    /// Returns `None` if `offset` is at or past the stream length.
    pub fn physical_offset(&self, offset: u64) -> Option<u64> {
        if offset >= self.capacity() {
            return None;
        }
        let block_size = u64::from(self.block_size);
        let block = *self.blocks.get((offset / block_size) as usize)?;
        Some(u64::from(block) * block_size + offset % block_size)
    }
}

/// Snapshot of the container's block allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsfLayout {
    /// Block size in bytes.
    pub block_size: u32,
    /// Total blocks in the file, reserved blocks included.
    pub block_count: u32,
    /// Per-stream layouts indexed by [`StreamId`].
    pub streams: Vec<StreamLayout>,
}

impl MsfLayout {
    /// Layout of the given stream.
    pub fn stream(&self, id: StreamId) -> Option<&StreamLayout> {
        self.streams.get(id.0 as usize)
    }

    /// Number of streams in the directory.
    pub fn num_streams(&self) -> usize {
        self.streams.len()
    }

    /// Size of the backing file in bytes.
    pub fn file_size(&self) -> u64 {
        u64::from(self.block_count) * u64::from(self.block_size)
    }
}

/// Hands out blocks for streams in reservation order.
///
/// Callers reserve each stream's exact length up front; the allocator
/// answers with a [`StreamId`] whose [`StreamLayout`] says where to write.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    config: MsfConfig,
    next_block: u32,
    streams: Vec<StreamLayout>,
}

impl BlockAllocator {
    /// Create an allocator after validating `config`.
    pub fn new(config: MsfConfig) -> Result<Self, MsfConfigError> {
        config.validate()?;
        Ok(BlockAllocator {
            config,
            next_block: RESERVED_BLOCKS,
            streams: Vec::new(),
        })
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> u32 {
        self.config.block_size
    }

    /// Reserve `length` bytes for a new stream.
    pub fn add_stream(&mut self, length: u64) -> Result<StreamId, MsfError> {
        let length = u32::try_from(length).map_err(|_| MsfError::StreamTooLarge(length))?;

        let id = u16::try_from(self.streams.len())
            .ok()
            .map(StreamId)
            .filter(|id| id.is_valid())
            .ok_or(MsfError::TooManyStreams)?;

        let layout = StreamLayout::contiguous(self.config.block_size, self.next_block, length)?;
        self.next_block += layout.blocks().len() as u32;

        debug!(
            target: "pdbwriter::msf",
            stream = %id,
            length,
            blocks = layout.blocks().len(),
            "Reserved stream"
        );
        self.streams.push(layout);
        Ok(id)
    }

    /// Layout of a reserved stream.
    pub fn stream_layout(&self, id: StreamId) -> Result<&StreamLayout, MsfError> {
        self.streams
            .get(id.0 as usize)
            .ok_or(MsfError::StreamNotFound(id))
    }

    /// Snapshot the current allocation.
    pub fn layout(&self) -> MsfLayout {
        MsfLayout {
            block_size: self.config.block_size,
            block_count: self.next_block,
            streams: self.streams.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_for() {
        assert_eq!(blocks_for(0, 512), 0);
        assert_eq!(blocks_for(1, 512), 1);
        assert_eq!(blocks_for(512, 512), 1);
        assert_eq!(blocks_for(513, 512), 2);
    }

    #[test]
    fn test_layout_new_validates_block_count() {
        assert!(StreamLayout::new(512, 1000, vec![3, 4]).is_ok());
        let err = StreamLayout::new(512, 1000, vec![3]).unwrap_err();
        assert!(matches!(
            err,
            MsfError::InvalidLayout {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_stream_has_no_blocks() {
        let layout = StreamLayout::contiguous(4096, 3, 0).unwrap();
        assert!(layout.blocks().is_empty());
        assert_eq!(layout.capacity(), 0);
        assert_eq!(layout.physical_end(), 0);
        assert_eq!(layout.physical_offset(0), None);
    }

    #[test]
    fn test_physical_offset_discontiguous() {
        let layout = StreamLayout::new(512, 1200, vec![7, 3, 10]).unwrap();
        assert_eq!(layout.physical_offset(0), Some(7 * 512));
        assert_eq!(layout.physical_offset(511), Some(7 * 512 + 511));
        assert_eq!(layout.physical_offset(512), Some(3 * 512));
        assert_eq!(layout.physical_offset(1199), Some(10 * 512 + 175));
        assert_eq!(layout.physical_offset(1200), None);
        assert_eq!(layout.physical_end(), 11 * 512);
    }

    #[test]
    fn test_allocator_rejects_bad_config() {
        let err = BlockAllocator::new(MsfConfig::new().with_block_size(100)).unwrap_err();
        assert_eq!(err, MsfConfigError::InvalidBlockSize(100));
    }

    #[test]
    fn test_allocator_sequential_streams() {
        let mut alloc = BlockAllocator::new(MsfConfig::for_testing()).unwrap();
        let a = alloc.add_stream(100).unwrap();
        let b = alloc.add_stream(1100).unwrap();
        let c = alloc.add_stream(0).unwrap();

        assert_eq!((a, b, c), (StreamId(0), StreamId(1), StreamId(2)));
        assert_eq!(alloc.stream_layout(a).unwrap().blocks(), &[3]);
        assert_eq!(alloc.stream_layout(b).unwrap().blocks(), &[4, 5, 6]);
        assert!(alloc.stream_layout(c).unwrap().blocks().is_empty());

        let layout = alloc.layout();
        assert_eq!(layout.block_count, 7);
        assert_eq!(layout.num_streams(), 3);
        assert_eq!(layout.file_size(), 7 * 512);
        assert_eq!(layout.stream(b).unwrap().length(), 1100);
        assert!(layout.stream(StreamId(3)).is_none());
    }

    #[test]
    fn test_allocator_stream_too_large() {
        let mut alloc = BlockAllocator::new(MsfConfig::default()).unwrap();
        let err = alloc.add_stream(u64::from(u32::MAX) + 1).unwrap_err();
        assert!(matches!(err, MsfError::StreamTooLarge(_)));
    }

    #[test]
    fn test_allocator_unknown_stream() {
        let alloc = BlockAllocator::new(MsfConfig::default()).unwrap();
        let err = alloc.stream_layout(StreamId(5)).unwrap_err();
        assert!(matches!(err, MsfError::StreamNotFound(StreamId(5))));
    }

    #[test]
    fn test_layout_serializes() {
        let layout = StreamLayout::new(512, 10, vec![4]).unwrap();
        let json = serde_json::to_string(&layout).unwrap();
        let back: StreamLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn test_layout_rejects_zero_block_size() {
        let err = StreamLayout::new(0, 0, vec![]).unwrap_err();
        assert!(matches!(
            err,
            MsfError::Config(MsfConfigError::InvalidBlockSize(0))
        ));
        let err = StreamLayout::new(1000, 10, vec![4]).unwrap_err();
        assert!(matches!(
            err,
            MsfError::Config(MsfConfigError::InvalidBlockSize(1000))
        ));
    }

    #[test]
    fn test_contiguous_rejects_zero_block_size() {
        let err = StreamLayout::contiguous(0, 3, 100).unwrap_err();
        assert!(matches!(
            err,
            MsfError::Config(MsfConfigError::InvalidBlockSize(0))
        ));
    }

    #[test]
    fn test_deserialize_validates_layout() {
        let zero = r#"{"block_size":0,"length":10,"blocks":[4]}"#;
        let err = serde_json::from_str::<StreamLayout>(zero).unwrap_err();
        assert!(err.to_string().contains("Invalid block size 0"));

        let short = r#"{"block_size":512,"length":1000,"blocks":[4]}"#;
        assert!(serde_json::from_str::<StreamLayout>(short).is_err());

        let container = r#"{"block_size":512,"block_count":5,"streams":[{"block_size":0,"length":10,"blocks":[4]}]}"#;
        assert!(serde_json::from_str::<MsfLayout>(container).is_err());
    }

    #[test]
    fn test_stream_id_display() {
        assert_eq!(StreamId(2).to_string(), "#2");
        assert!(!StreamId::INVALID.is_valid());
    }
}
