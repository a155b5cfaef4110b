//! Logical stream view over a block list.
//!
//! [`MappedBlockStream`] presents a single stream as a contiguous byte
//! range starting at offset 0, and scatters each write onto the physical
//! blocks its [`StreamLayout`] names. A write that spans a block boundary
//! becomes one physical write per block touched.

use crate::error::MsfError;
use crate::layout::StreamLayout;
use crate::stream::{check_bounds, WritableStream};

/// Writable view of one stream inside a destination.
pub struct MappedBlockStream<'a, W: WritableStream + ?Sized> {
    layout: &'a StreamLayout,
    destination: &'a mut W,
}

impl<'a, W: WritableStream + ?Sized> MappedBlockStream<'a, W> {
    /// Map `layout` onto `destination`.
    pub fn new(layout: &'a StreamLayout, destination: &'a mut W) -> Self {
        MappedBlockStream {
            layout,
            destination,
        }
    }

    /// Layout this view writes through.
    pub fn layout(&self) -> &StreamLayout {
        self.layout
    }
}

impl<W: WritableStream + ?Sized> WritableStream for MappedBlockStream<'_, W> {
    fn len(&self) -> u64 {
        self.layout.capacity()
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError> {
        check_bounds(offset, data.len(), self.layout.capacity())?;

        let block_size = u64::from(self.layout.block_size());
        let mut offset = offset;
        let mut remaining = data;
        while !remaining.is_empty() {
            let in_block = offset % block_size;
            let chunk = remaining.len().min((block_size - in_block) as usize);
            let physical = self
                .layout
                .physical_offset(offset)
                .ok_or(MsfError::OutOfBounds {
                    offset,
                    len: remaining.len(),
                    capacity: self.layout.capacity(),
                })?;

            self.destination.write_bytes(physical, &remaining[..chunk])?;
            offset += chunk as u64;
            remaining = &remaining[chunk..];
        }
        Ok(())
    }
}
