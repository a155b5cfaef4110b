//! Identifier and tag types for the type-information stream
//!
//! This module defines the small value types that appear in the TPI stream
//! header and on type records:
//! - TypeIndex: Sequential record identifier
//! - TpiVersion: Header version tag
//! - LeafKind: CodeView record kind

use crate::limits::FIRST_NON_SIMPLE_INDEX;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential identifier of a type record.
///
/// Indices are assigned in append order starting at
/// [`FIRST_NON_SIMPLE_INDEX`]; everything below that value names a
/// built-in type and never refers to a record in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex(pub u32);

impl TypeIndex {
    /// The index of the first record in any TPI stream.
    pub const FIRST_NON_SIMPLE: TypeIndex = TypeIndex(FIRST_NON_SIMPLE_INDEX);

    /// Raw 32-bit value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if this index names a built-in type.
    pub fn is_simple(self) -> bool {
        self.0 < FIRST_NON_SIMPLE_INDEX
    }

    /// Index `count` positions after this one, or `None` on 32-bit overflow.
    pub fn checked_add(self, count: u32) -> Option<TypeIndex> {
        self.0.checked_add(count).map(TypeIndex)
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl From<TypeIndex> for u32 {
    fn from(index: TypeIndex) -> u32 {
        index.0
    }
}

/// TPI stream format version.
///
/// The discriminants are the date-stamps written verbatim into the header.
/// Modern toolchains write `V80`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TpiVersion {
    /// VC 4.0
    V40 = 19950410,
    /// VC 4.1
    V41 = 19951122,
    /// VC 5.0
    V50 = 19961031,
    /// VC 7.0
    V70 = 19990903,
    /// VC 8.0 and later
    V80 = 20040203,
}

impl TpiVersion {
    /// Convert to the on-disk representation
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Try to create from the on-disk representation
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            19950410 => Some(TpiVersion::V40),
            19951122 => Some(TpiVersion::V41),
            19961031 => Some(TpiVersion::V50),
            19990903 => Some(TpiVersion::V70),
            20040203 => Some(TpiVersion::V80),
            _ => None,
        }
    }
}

impl Default for TpiVersion {
    fn default() -> Self {
        TpiVersion::V80
    }
}

/// CodeView leaf kind of a type record.
///
/// Opaque to the stream builder; carried so callers can inspect what they
/// appended. Only a handful of common kinds get named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafKind(pub u16);

impl LeafKind {
    /// `LF_POINTER`
    pub const POINTER: LeafKind = LeafKind(0x1002);
    /// `LF_MODIFIER`
    pub const MODIFIER: LeafKind = LeafKind(0x1001);
    /// `LF_PROCEDURE`
    pub const PROCEDURE: LeafKind = LeafKind(0x1008);
    /// `LF_ARGLIST`
    pub const ARGLIST: LeafKind = LeafKind(0x1201);
    /// `LF_FIELDLIST`
    pub const FIELDLIST: LeafKind = LeafKind(0x1203);
    /// `LF_CLASS`
    pub const CLASS: LeafKind = LeafKind(0x1504);
    /// `LF_STRUCTURE`
    pub const STRUCTURE: LeafKind = LeafKind(0x1505);
    /// `LF_UNION`
    pub const UNION: LeafKind = LeafKind(0x1506);
    /// `LF_ENUM`
    pub const ENUM: LeafKind = LeafKind(0x1507);

    /// Raw 16-bit value.
    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
