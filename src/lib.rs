//! pdbwriter - program database (PDB) stream writers
//!
//! Builds the type-information (TPI) stream of a PDB file and writes it
//! through the block layout of an MSF container.
//!
//! # Quick Start
//!
//! ```
//! use pdbwriter::msf::{BlockAllocator, MemoryBuffer, MsfConfig};
//! use pdbwriter::tpi::TpiStreamBuilder;
//! use pdbwriter::{LeafKind, TypeRecord};
//!
//! let mut builder = TpiStreamBuilder::new();
//! let record = TypeRecord::encode(LeafKind::ARGLIST, &[0, 0, 0, 0]).unwrap();
//! let index = builder.add_type_record(record).unwrap();
//! assert_eq!(index.as_u32(), 0x1000);
//!
//! // Size, then place
//! let mut alloc = BlockAllocator::new(MsfConfig::default()).unwrap();
//! let id = alloc.add_stream(builder.calculate_serialized_length()).unwrap();
//! let container = alloc.layout();
//! let mut file = MemoryBuffer::with_len(container.file_size() as usize);
//!
//! let tpi = builder.build(&container, id, &file).unwrap();
//! builder.commit(container.stream(id).unwrap(), &mut file).unwrap();
//! assert_eq!(tpi.num_type_records(), 1);
//! ```
//!
//! # Architecture
//!
//! - `pdbwriter-core`: type indices, versions, and encoded type records
//! - `pdbwriter-msf`: block layout, destinations, and mapped stream writes
//! - `pdbwriter-tpi`: TPI header and the stream builder

pub use pdbwriter_core::*;

/// MSF container layout and writable destinations.
pub mod msf {
    pub use pdbwriter_msf::*;
}

/// TPI stream header, builder, and handle.
pub mod tpi {
    pub use pdbwriter_tpi::*;
}
