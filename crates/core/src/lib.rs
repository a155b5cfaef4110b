//! Core types for PDB stream writers
//!
//! This crate defines the foundational types shared by the container and
//! stream crates:
//! - TypeIndex: Sequential identifier assigned to type records
//! - TpiVersion: Format version stamped into the TPI stream header
//! - LeafKind: CodeView record kind discriminator
//! - TypeRecord: Opaque, immutable, already-encoded type record
//! - Limits: Fixed bounds imposed by the on-disk format

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod limits;
pub mod record;
pub mod types;

pub use limits::{
    FIRST_NON_SIMPLE_INDEX, MAX_RECORD_LENGTH, RECORD_PREFIX_SIZE, TPI_HASH_KEY_SIZE,
    TPI_MAX_HASH_BUCKETS,
};
pub use record::{RecordError, TypeRecord};
pub use types::{LeafKind, TpiVersion, TypeIndex};
