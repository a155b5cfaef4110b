//! Lazy concatenation of byte items.
//!
//! [`SequencedItemStream`] is a view over an ordered slice of items that
//! behaves like the concatenation of their bytes without ever building
//! that concatenation. Length queries walk the items; writes emit one
//! destination write per item.
//!
//! The view borrows its items, so it is restartable: every call to
//! [`SequencedItemStream::total_length`], [`SequencedItemStream::chunks`]
//! or [`SequencedItemStream::write_to`] traverses the current items from
//! the start and sees the same sequence.

use crate::error::MsfError;
use crate::stream::WritableStream;
use pdbwriter_core::TypeRecord;
use tracing::trace;

/// An item with a fixed byte representation.
pub trait SequencedItem {
    /// Number of bytes `bytes()` returns.
    fn length(&self) -> usize {
        self.bytes().len()
    }

    /// The exact bytes written for this item.
    fn bytes(&self) -> &[u8];
}

impl SequencedItem for TypeRecord {
    fn length(&self) -> usize {
        self.len()
    }

    fn bytes(&self) -> &[u8] {
        TypeRecord::bytes(self)
    }
}

impl SequencedItem for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

/// Concatenation view over a slice of items.
#[derive(Debug)]
pub struct SequencedItemStream<'a, T> {
    items: &'a [T],
}

// Manual impls: a view is copyable regardless of `T`.
impl<T> Clone for SequencedItemStream<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SequencedItemStream<'_, T> {}

impl<'a, T: SequencedItem> SequencedItemStream<'a, T> {
    /// View over `items`, in order.
    pub fn new(items: &'a [T]) -> Self {
        SequencedItemStream { items }
    }

    /// Number of items.
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Items in this view.
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// Sum of all item lengths.
    ///
    /// Recomputed on every call.
    pub fn total_length(&self) -> u64 {
        self.items.iter().map(|item| item.length() as u64).sum()
    }

    /// The items' byte slices, in order.
    pub fn chunks(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.items.iter().map(|item| item.bytes())
    }

    /// Write every item contiguously starting at `start_offset`.
    ///
    /// Each non-empty item is written with a single `write_bytes` call.
    /// Stops at the first failing write; items after it are not attempted.
    /// Returns the offset one past the last byte written.
    pub fn write_to<W: WritableStream + ?Sized>(
        &self,
        sink: &mut W,
        start_offset: u64,
    ) -> Result<u64, MsfError> {
        let mut offset = start_offset;
        for (index, item) in self.items.iter().enumerate() {
            let bytes = item.bytes();
            if !bytes.is_empty() {
                trace!(target: "pdbwriter::msf", index, offset, len = bytes.len(), "Writing item");
                sink.write_bytes(offset, bytes)?;
            }
            offset += bytes.len() as u64;
        }
        Ok(offset)
    }
}
