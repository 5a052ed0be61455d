// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Built-in type ids, value ranks and the [`TypeInfo`] discriminant.
//!
//! Every value a [`Variant`](crate::variant::Variant) can hold is classified
//! by a `(built-in type, value rank)` pair. The built-in type is the wire
//! type id from OPC UA Part 6; the rank distinguishes scalars, one-dimensional
//! arrays and N-dimensional matrices.
//!
//! `Enumeration` is an alias of `Int32` on the wire: two [`TypeInfo`] values
//! that differ only in that respect compare (and hash) equal.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// =============================================================================
// BuiltInType
// =============================================================================

/// OPC UA built-in type ids.
///
/// The discriminants 0..=25 are the wire type ids used by both the binary
/// `Variant` encoding byte and the JSON `Type` field. `Enumeration` is a
/// non-wire alias that encodes as `Int32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BuiltInType {
    /// No value.
    Null = 0,
    /// Boolean.
    Boolean = 1,
    /// Signed 8-bit integer.
    SByte = 2,
    /// Unsigned 8-bit integer.
    Byte = 3,
    /// Signed 16-bit integer.
    Int16 = 4,
    /// Unsigned 16-bit integer.
    UInt16 = 5,
    /// Signed 32-bit integer.
    Int32 = 6,
    /// Unsigned 32-bit integer.
    UInt32 = 7,
    /// Signed 64-bit integer.
    Int64 = 8,
    /// Unsigned 64-bit integer.
    UInt64 = 9,
    /// IEEE-754 single precision.
    Float = 10,
    /// IEEE-754 double precision.
    Double = 11,
    /// UTF-8 string.
    String = 12,
    /// Instant in time (100 ns resolution, 1601 epoch on the binary wire).
    DateTime = 13,
    /// 128-bit globally unique identifier.
    Guid = 14,
    /// Opaque byte sequence.
    ByteString = 15,
    /// XML element carried as text.
    XmlElement = 16,
    /// Node identifier.
    NodeId = 17,
    /// Node identifier with namespace URI / server index.
    ExpandedNodeId = 18,
    /// 32-bit status code.
    StatusCode = 19,
    /// Qualified (namespace-scoped) name.
    QualifiedName = 20,
    /// Locale-tagged text.
    LocalizedText = 21,
    /// Opaquely-typed structured body.
    ExtensionObject = 22,
    /// Value with status and timestamps.
    DataValue = 23,
    /// Nested variant.
    Variant = 24,
    /// Recursive diagnostic structure.
    DiagnosticInfo = 25,
    /// Enumerated value; encodes as `Int32` on every wire.
    Enumeration = 29,
}

impl BuiltInType {
    /// Resolves a wire type id (0..=25) to a built-in type.
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::SByte,
            3 => Self::Byte,
            4 => Self::Int16,
            5 => Self::UInt16,
            6 => Self::Int32,
            7 => Self::UInt32,
            8 => Self::Int64,
            9 => Self::UInt64,
            10 => Self::Float,
            11 => Self::Double,
            12 => Self::String,
            13 => Self::DateTime,
            14 => Self::Guid,
            15 => Self::ByteString,
            16 => Self::XmlElement,
            17 => Self::NodeId,
            18 => Self::ExpandedNodeId,
            19 => Self::StatusCode,
            20 => Self::QualifiedName,
            21 => Self::LocalizedText,
            22 => Self::ExtensionObject,
            23 => Self::DataValue,
            24 => Self::Variant,
            25 => Self::DiagnosticInfo,
            _ => return None,
        })
    }

    /// Returns the wire type id for this type.
    ///
    /// `Enumeration` yields the `Int32` id; it has no id of its own.
    #[inline]
    pub fn wire_id(self) -> u8 {
        self.normalized() as u8
    }

    /// Resolves wire aliases: `Enumeration` normalizes to `Int32`, every
    /// other type to itself.
    #[inline]
    pub fn normalized(self) -> Self {
        match self {
            Self::Enumeration => Self::Int32,
            other => other,
        }
    }

    /// Returns `true` if this is one of the eleven fixed-size numeric types
    /// (`Boolean` through `Double`).
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(
            self.normalized(),
            Self::Boolean
                | Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }

    /// Returns `true` if values of this type are encoded as JSON strings
    /// even at scalar rank (64-bit integers outside the safe range, dates,
    /// guids, byte strings and XML elements).
    #[inline]
    pub fn is_text_encoded(self) -> bool {
        matches!(
            self,
            Self::DateTime | Self::Guid | Self::ByteString | Self::XmlElement
        )
    }
}

impl fmt::Display for BuiltInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// ValueRank
// =============================================================================

/// Dimensionality of a variant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueRank {
    /// A single value.
    Scalar,
    /// A one-dimensional array.
    OneDimension,
    /// A matrix with two or more dimensions.
    TwoOrMoreDimensions,
}

impl ValueRank {
    /// Returns the protocol integer form (-1 for scalar, 1 for arrays,
    /// 2 for matrices).
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Scalar => -1,
            Self::OneDimension => 1,
            Self::TwoOrMoreDimensions => 2,
        }
    }

    /// Classifies a protocol value rank. Ranks of 2 or more all classify as
    /// [`ValueRank::TwoOrMoreDimensions`].
    pub fn from_i32(rank: i32) -> Option<Self> {
        match rank {
            -1 => Some(Self::Scalar),
            1 => Some(Self::OneDimension),
            r if r >= 2 => Some(Self::TwoOrMoreDimensions),
            _ => None,
        }
    }
}

// =============================================================================
// TypeInfo
// =============================================================================

/// The `(built-in type, rank)` discriminant of a variant value.
///
/// Compared and hashed by value with the `Enumeration` == `Int32` alias rule
/// applied, so a `TypeInfo` derived from a decoded wire value always matches
/// one declared with the alias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeInfo {
    /// The built-in type of the value (of the elements, for arrays).
    pub builtin: BuiltInType,
    /// The dimensionality of the value.
    pub rank: ValueRank,
}

impl TypeInfo {
    /// Type info for the null/empty value.
    pub const NULL: TypeInfo = TypeInfo {
        builtin: BuiltInType::Null,
        rank: ValueRank::Scalar,
    };

    /// Creates scalar type info.
    #[inline]
    pub const fn scalar(builtin: BuiltInType) -> Self {
        TypeInfo {
            builtin,
            rank: ValueRank::Scalar,
        }
    }

    /// Creates one-dimensional array type info.
    #[inline]
    pub const fn array(builtin: BuiltInType) -> Self {
        TypeInfo {
            builtin,
            rank: ValueRank::OneDimension,
        }
    }

    /// Creates matrix (rank >= 2) type info.
    #[inline]
    pub const fn matrix(builtin: BuiltInType) -> Self {
        TypeInfo {
            builtin,
            rank: ValueRank::TwoOrMoreDimensions,
        }
    }

    /// Returns `true` if this describes the null value.
    #[inline]
    pub fn is_null(self) -> bool {
        self.builtin == BuiltInType::Null && self.rank == ValueRank::Scalar
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.builtin.normalized() == other.builtin.normalized() && self.rank == other.rank
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.builtin.normalized().hash(state);
        self.rank.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            ValueRank::Scalar => write!(f, "{}", self.builtin),
            ValueRank::OneDimension => write!(f, "{}[]", self.builtin),
            ValueRank::TwoOrMoreDimensions => write!(f, "{}[,]", self.builtin),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(info: TypeInfo) -> u64 {
        let mut hasher = DefaultHasher::new();
        info.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_builtin_wire_id_round_trip() {
        for id in 0..=25u8 {
            let bt = BuiltInType::from_id(id).unwrap();
            assert_eq!(bt.wire_id(), id);
        }
        assert!(BuiltInType::from_id(26).is_none());
    }

    #[test]
    fn test_enumeration_aliases_int32() {
        assert_eq!(BuiltInType::Enumeration.normalized(), BuiltInType::Int32);
        assert_eq!(BuiltInType::Enumeration.wire_id(), 6);

        let declared = TypeInfo::scalar(BuiltInType::Enumeration);
        let derived = TypeInfo::scalar(BuiltInType::Int32);
        assert_eq!(declared, derived);
        assert_eq!(hash_of(declared), hash_of(derived));
    }

    #[test]
    fn test_value_rank_classification() {
        assert_eq!(ValueRank::from_i32(-1), Some(ValueRank::Scalar));
        assert_eq!(ValueRank::from_i32(1), Some(ValueRank::OneDimension));
        assert_eq!(ValueRank::from_i32(2), Some(ValueRank::TwoOrMoreDimensions));
        assert_eq!(ValueRank::from_i32(5), Some(ValueRank::TwoOrMoreDimensions));
        assert_eq!(ValueRank::from_i32(0), None);
    }

    #[test]
    fn test_type_info_display() {
        assert_eq!(TypeInfo::scalar(BuiltInType::UInt32).to_string(), "UInt32");
        assert_eq!(TypeInfo::array(BuiltInType::Double).to_string(), "Double[]");
        assert_eq!(TypeInfo::matrix(BuiltInType::Int32).to_string(), "Int32[,]");
    }

    #[test]
    fn test_numeric_classification() {
        assert!(BuiltInType::Boolean.is_numeric());
        assert!(BuiltInType::Double.is_numeric());
        assert!(BuiltInType::Enumeration.is_numeric());
        assert!(!BuiltInType::String.is_numeric());
        assert!(!BuiltInType::Null.is_numeric());
    }
}
