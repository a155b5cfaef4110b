//! Positioned-write destinations.
//!
//! A destination is the physical, block-addressed backing of a container:
//! a fixed-size byte range that accepts writes at arbitrary offsets.
//! Destinations report failures as [`MsfError`] and never panic on bad
//! offsets.

use crate::error::MsfError;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sink supporting positioned writes into a fixed-size byte range.
pub trait WritableStream {
    /// Total bytes addressable in this destination.
    fn len(&self) -> u64;

    /// Write all of `data` starting at `offset`.
    ///
    /// Fails without writing anything if the range exceeds `len()`.
    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError>;

    /// Returns `true` if the destination holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<W: WritableStream + ?Sized> WritableStream for &mut W {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError> {
        (**self).write_bytes(offset, data)
    }
}

/// Reject a write that would run past `capacity`.
pub(crate) fn check_bounds(offset: u64, len: usize, capacity: u64) -> Result<(), MsfError> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(MsfError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

/// Fixed-size in-memory destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBuffer {
    data: Vec<u8>,
}

impl MemoryBuffer {
    /// Zero-filled buffer of `len` bytes.
    pub fn with_len(len: usize) -> Self {
        MemoryBuffer { data: vec![0u8; len] }
    }

    /// Contents of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its contents.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl WritableStream for MemoryBuffer {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError> {
        check_bounds(offset, data.len(), self.len())?;
        let start = offset as usize;
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// File-backed destination of fixed length.
pub struct FileBuffer {
    file: File,
    len: u64,
    path: PathBuf,
}

impl FileBuffer {
    /// Create (or truncate) `path` and size it to `len` bytes.
    pub fn create(path: &Path, len: u64) -> Result<Self, MsfError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .truncate(true)
            .open(path)?;
        file.set_len(len)?;

        debug!(target: "pdbwriter::msf", path = %path.display(), len, "Created file destination");

        Ok(FileBuffer {
            file,
            len,
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush file contents to disk.
    pub fn sync(&mut self) -> Result<(), MsfError> {
        self.file.sync_all()?;
        Ok(())
    }
}

impl WritableStream for FileBuffer {
    fn len(&self) -> u64 {
        self.len
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError> {
        check_bounds(offset, data.len(), self.len)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }
}
