//! Testing utilities for container writes
//!
//! - **FaultyStream**: Destination wrapper that records every write and can
//!   inject an I/O failure at a chosen write
//!
//! # Example
//!
//! ```
//! use pdbwriter_msf::testing::FaultyStream;
//! use pdbwriter_msf::{MemoryBuffer, WritableStream};
//!
//! let mut dest = FaultyStream::new(MemoryBuffer::with_len(8)).fail_at(1);
//! assert!(dest.write_bytes(0, &[1, 2]).is_ok());
//! assert!(dest.write_bytes(2, &[3, 4]).is_err());
//! assert_eq!(dest.attempts(), 2);
//! ```

use crate::error::MsfError;
use crate::stream::WritableStream;
use std::io;

/// Destination wrapper with write recording and fault injection.
#[derive(Debug)]
pub struct FaultyStream<W> {
    inner: W,
    fail_at: Option<usize>,
    attempts: usize,
    writes: Vec<(u64, usize)>,
}

impl<W: WritableStream> FaultyStream<W> {
    /// Wrap `inner` without injecting any failure.
    pub fn new(inner: W) -> Self {
        FaultyStream {
            inner,
            fail_at: None,
            attempts: 0,
            writes: Vec::new(),
        }
    }

    /// Fail the write with the given zero-based attempt number.
    ///
    /// Only that one attempt fails; later writes go through, so tests can
    /// observe whether a caller kept writing after an error.
    pub fn fail_at(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }

    /// Number of `write_bytes` calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// `(offset, len)` of every successful write, in order.
    pub fn writes(&self) -> &[(u64, usize)] {
        &self.writes
    }

    /// Total bytes successfully written.
    pub fn bytes_written(&self) -> u64 {
        self.writes.iter().map(|&(_, len)| len as u64).sum()
    }

    /// The wrapped destination.
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Unwrap the destination.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: WritableStream> WritableStream for FaultyStream<W> {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<(), MsfError> {
        let attempt = self.attempts;
        self.attempts += 1;

        if self.fail_at == Some(attempt) {
            return Err(MsfError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("injected failure on write {}", attempt),
            )));
        }

        self.inner.write_bytes(offset, data)?;
        self.writes.push((offset, data.len()));
        Ok(())
    }
}
