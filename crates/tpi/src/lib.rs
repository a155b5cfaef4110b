//! Type-information (TPI) stream builder
//!
//! Accumulates opaque type records, derives the fixed-size TPI stream
//! header from them, reports the exact serialized length before the
//! container allocates space, and commits header plus records into
//! whatever block layout the container assigned.
//!
//! # Protocol
//!
//! ```text
//! add_type_record* -> calculate_serialized_length -> (container reserves)
//!                  -> finalize -> build -> commit
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod header;
pub mod stream;

pub use builder::{BuilderState, TpiStreamBuilder};
pub use error::{BuildError, CommitError, FinalizeError, HeaderError};
pub use header::{EmbeddedBuf, TpiStreamHeader, TPI_HEADER_SIZE};
pub use stream::TpiStream;
