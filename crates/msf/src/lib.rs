//! Multi-stream file (MSF) container plumbing
//!
//! This crate handles the container side of PDB stream writing:
//!
//! - Config: Block size selection and validation
//! - Layout: Block allocation and per-stream block lists
//! - Destinations: Positioned-write sinks (memory, file)
//! - Mapped streams: Logical stream offsets translated onto block lists
//! - Sequenced streams: Lazy concatenation of items without copying
//! - Testing: Fault-injecting destination wrappers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod layout;
pub mod mapped;
pub mod sequenced;
pub mod stream;
pub mod testing;

pub use config::{MsfConfig, MsfConfigError};
pub use error::MsfError;
pub use layout::{BlockAllocator, MsfLayout, StreamId, StreamLayout, RESERVED_BLOCKS};
pub use mapped::MappedBlockStream;
pub use sequenced::{SequencedItem, SequencedItemStream};
pub use stream::{FileBuffer, MemoryBuffer, WritableStream};
