//! Fixed bounds of the CodeView / TPI on-disk format
//!
//! These values are defined by the PDB format, not by this crate, and are
//! FROZEN: changing any of them produces files debuggers cannot read.

/// Type indices below this value are reserved for simple (built-in) types.
///
/// The first record appended to a TPI stream receives this index.
pub const FIRST_NON_SIMPLE_INDEX: u32 = 0x1000;

/// Size of the `record_len` + `kind` prefix of a serialized CodeView record.
pub const RECORD_PREFIX_SIZE: usize = 4;

/// Maximum value of the 16-bit `record_len` prefix of a CodeView record.
///
/// The prefix counts every byte after the length field itself, so the
/// largest serialized record is `MAX_RECORD_LENGTH + 2` bytes.
pub const MAX_RECORD_LENGTH: usize = 0xFF00;

/// Width of a hash value in the TPI hash stream.
pub const TPI_HASH_KEY_SIZE: u32 = 4;

/// Number of hash buckets the TPI hash stream supports.
pub const TPI_MAX_HASH_BUCKETS: u32 = 0x40000;
