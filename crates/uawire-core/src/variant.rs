// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The tagged-union value type.
//!
//! A [`Variant`] holds exactly one value of any protocol built-in type, at
//! scalar, array or matrix rank. The original overlapping-storage design is
//! re-architected here as an explicit sum type: type/rank consistency is
//! enforced once at construction and never re-verified on access.
//!
//! # Construction
//!
//! Primitive values convert explicitly, one conversion per source type, and
//! the target built-in type of each conversion is part of the wire contract:
//!
//! ```
//! use uawire_core::variant::Variant;
//! use uawire_core::types::{BuiltInType, TypeInfo};
//!
//! let value = Variant::from(42u32);
//! assert_eq!(value.type_info(), TypeInfo::scalar(BuiltInType::UInt32));
//!
//! // A byte vector is a ByteString scalar, not a Byte array.
//! let bytes = Variant::from(vec![1u8, 2, 3]);
//! assert_eq!(value.is_null(), false);
//! assert_eq!(bytes.builtin_type(), BuiltInType::ByteString);
//! ```
//!
//! # Equality
//!
//! Equality is recursive and total. The eleven fixed-size numeric types
//! compare by bit pattern, so `NaN == NaN` holds inside a variant — two
//! decoded messages carrying NaN compare equal, which round-trip tests
//! depend on.

use uuid::Uuid;

use crate::matrix::{Matrix, VariantArray};
use crate::status::StatusCode;
use crate::types::builtin::{BuiltInType, TypeInfo, ValueRank};
use crate::types::byte_string::ByteString;
use crate::types::data_value::DataValue;
use crate::types::date_time::UaDateTime;
use crate::types::diagnostic_info::DiagnosticInfo;
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::ExtensionObject;
use crate::types::localized_text::LocalizedText;
use crate::types::node_id::NodeId;
use crate::types::qualified_name::QualifiedName;
use crate::error::EncodingResult;

// =============================================================================
// Variant
// =============================================================================

/// A value of any built-in type at scalar, array or matrix rank.
///
/// `Null` is the only null value: a numeric variant always holds a concrete
/// bit pattern once constructed.
#[derive(Debug, Clone, Default)]
pub enum Variant {
    /// No value.
    #[default]
    Null,
    /// Boolean scalar.
    Boolean(bool),
    /// Signed 8-bit scalar.
    SByte(i8),
    /// Unsigned 8-bit scalar.
    Byte(u8),
    /// Signed 16-bit scalar.
    Int16(i16),
    /// Unsigned 16-bit scalar.
    UInt16(u16),
    /// Signed 32-bit scalar.
    Int32(i32),
    /// Unsigned 32-bit scalar.
    UInt32(u32),
    /// Signed 64-bit scalar.
    Int64(i64),
    /// Unsigned 64-bit scalar.
    UInt64(u64),
    /// Single-precision scalar.
    Float(f32),
    /// Double-precision scalar.
    Double(f64),
    /// String scalar.
    String(String),
    /// Timestamp scalar.
    DateTime(UaDateTime),
    /// Guid scalar.
    Guid(Uuid),
    /// Byte-string scalar.
    ByteString(ByteString),
    /// XML element scalar, carried as text.
    XmlElement(String),
    /// Node id scalar.
    NodeId(Box<NodeId>),
    /// Expanded node id scalar.
    ExpandedNodeId(Box<ExpandedNodeId>),
    /// Status code scalar.
    StatusCode(StatusCode),
    /// Qualified name scalar.
    QualifiedName(Box<QualifiedName>),
    /// Localized text scalar.
    LocalizedText(Box<LocalizedText>),
    /// Extension object scalar.
    ExtensionObject(Box<ExtensionObject>),
    /// Data value scalar.
    DataValue(Box<DataValue>),
    /// Nested variant.
    Variant(Box<Variant>),
    /// Diagnostic info scalar.
    DiagnosticInfo(Box<DiagnosticInfo>),
    /// One-dimensional array.
    Array(Box<VariantArray>),
    /// N-dimensional matrix.
    Matrix(Box<Matrix>),
}

impl Variant {
    // =========================================================================
    // Classification
    // =========================================================================

    /// Returns the built-in type of this value (of the elements, for arrays
    /// and matrices).
    pub fn builtin_type(&self) -> BuiltInType {
        match self {
            Self::Null => BuiltInType::Null,
            Self::Boolean(_) => BuiltInType::Boolean,
            Self::SByte(_) => BuiltInType::SByte,
            Self::Byte(_) => BuiltInType::Byte,
            Self::Int16(_) => BuiltInType::Int16,
            Self::UInt16(_) => BuiltInType::UInt16,
            Self::Int32(_) => BuiltInType::Int32,
            Self::UInt32(_) => BuiltInType::UInt32,
            Self::Int64(_) => BuiltInType::Int64,
            Self::UInt64(_) => BuiltInType::UInt64,
            Self::Float(_) => BuiltInType::Float,
            Self::Double(_) => BuiltInType::Double,
            Self::String(_) => BuiltInType::String,
            Self::DateTime(_) => BuiltInType::DateTime,
            Self::Guid(_) => BuiltInType::Guid,
            Self::ByteString(_) => BuiltInType::ByteString,
            Self::XmlElement(_) => BuiltInType::XmlElement,
            Self::NodeId(_) => BuiltInType::NodeId,
            Self::ExpandedNodeId(_) => BuiltInType::ExpandedNodeId,
            Self::StatusCode(_) => BuiltInType::StatusCode,
            Self::QualifiedName(_) => BuiltInType::QualifiedName,
            Self::LocalizedText(_) => BuiltInType::LocalizedText,
            Self::ExtensionObject(_) => BuiltInType::ExtensionObject,
            Self::DataValue(_) => BuiltInType::DataValue,
            Self::Variant(_) => BuiltInType::Variant,
            Self::DiagnosticInfo(_) => BuiltInType::DiagnosticInfo,
            Self::Array(array) => array.element_type,
            Self::Matrix(matrix) => matrix.element_type,
        }
    }

    /// Returns the dimensionality of this value.
    pub fn value_rank(&self) -> ValueRank {
        match self {
            Self::Array(_) => ValueRank::OneDimension,
            Self::Matrix(_) => ValueRank::TwoOrMoreDimensions,
            _ => ValueRank::Scalar,
        }
    }

    /// Derives the `(built-in type, rank)` discriminant by inspecting the
    /// actual value.
    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo {
            builtin: self.builtin_type(),
            rank: self.value_rank(),
        }
    }

    /// Returns `true` if this is the null variant.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Tags a value with caller-supplied type info.
    ///
    /// In debug builds the derived type info must match the declared one,
    /// with two sanctioned exceptions: a `Byte` array declared as a
    /// `ByteString` scalar, and an `Int32` declared as `Enumeration` (the
    /// latter already compares equal under the alias rule). A mismatch is a
    /// caller bug, not wire data, and fails the assertion rather than being
    /// silently coerced.
    pub fn with_type_info(value: Variant, declared: TypeInfo) -> Variant {
        #[cfg(debug_assertions)]
        {
            let derived = value.type_info();
            let byte_string_alias = declared == TypeInfo::scalar(BuiltInType::ByteString)
                && derived == TypeInfo::array(BuiltInType::Byte);
            debug_assert!(
                value.is_null() || derived == declared || byte_string_alias,
                "variant type mismatch: derived {derived}, declared {declared}"
            );
        }
        let _ = declared;
        value
    }

    /// Creates a one-dimensional array variant, validating element types.
    pub fn array(element_type: BuiltInType, values: Vec<Variant>) -> EncodingResult<Variant> {
        Ok(Variant::Array(Box::new(VariantArray::new(
            element_type,
            values,
        )?)))
    }

    /// Creates a matrix variant from flat elements and a dimension vector.
    pub fn matrix(
        element_type: BuiltInType,
        elements: Vec<Variant>,
        dimensions: Vec<u32>,
    ) -> EncodingResult<Variant> {
        Ok(Variant::Matrix(Box::new(Matrix::new(
            element_type,
            elements,
            dimensions,
        )?)))
    }

    /// Synthesizes the canonical default value for a declared type/rank.
    ///
    /// Used when decoding an absent field that must still produce a
    /// well-typed value.
    pub fn default_for(info: TypeInfo) -> Variant {
        match info.rank {
            ValueRank::Scalar => Self::default_scalar(info.builtin),
            ValueRank::OneDimension => Variant::Array(Box::new(VariantArray::with_capacity(
                info.builtin,
                0,
            ))),
            ValueRank::TwoOrMoreDimensions => Variant::Matrix(Box::new(Matrix {
                element_type: info.builtin,
                elements: Vec::new(),
                dimensions: vec![0, 0],
            })),
        }
    }

    fn default_scalar(builtin: BuiltInType) -> Variant {
        match builtin {
            BuiltInType::Null => Variant::Null,
            BuiltInType::Boolean => Variant::Boolean(false),
            BuiltInType::SByte => Variant::SByte(0),
            BuiltInType::Byte => Variant::Byte(0),
            BuiltInType::Int16 => Variant::Int16(0),
            BuiltInType::UInt16 => Variant::UInt16(0),
            BuiltInType::Int32 | BuiltInType::Enumeration => Variant::Int32(0),
            BuiltInType::UInt32 => Variant::UInt32(0),
            BuiltInType::Int64 => Variant::Int64(0),
            BuiltInType::UInt64 => Variant::UInt64(0),
            BuiltInType::Float => Variant::Float(0.0),
            BuiltInType::Double => Variant::Double(0.0),
            BuiltInType::String => Variant::String(String::new()),
            BuiltInType::DateTime => Variant::DateTime(UaDateTime::min_value()),
            BuiltInType::Guid => Variant::Guid(Uuid::nil()),
            BuiltInType::ByteString => Variant::ByteString(ByteString::default()),
            BuiltInType::XmlElement => Variant::XmlElement(String::new()),
            BuiltInType::NodeId => Variant::NodeId(Box::new(NodeId::NULL)),
            BuiltInType::ExpandedNodeId => Variant::ExpandedNodeId(Box::new(ExpandedNodeId::NULL)),
            BuiltInType::StatusCode => Variant::StatusCode(StatusCode::GOOD),
            BuiltInType::QualifiedName => Variant::QualifiedName(Box::default()),
            BuiltInType::LocalizedText => Variant::LocalizedText(Box::default()),
            BuiltInType::ExtensionObject => Variant::ExtensionObject(Box::default()),
            BuiltInType::DataValue => Variant::DataValue(Box::default()),
            BuiltInType::Variant => Variant::Null,
            BuiltInType::DiagnosticInfo => Variant::DiagnosticInfo(Box::default()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the boolean value, if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64`, if this is any signed or unsigned
    /// integer scalar that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SByte(v) => Some(i64::from(*v)),
            Self::Byte(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::UInt16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::UInt32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `f64`, if this is a float scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array, if this is a one-dimensional array.
    pub fn as_array(&self) -> Option<&VariantArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the matrix, if this is a matrix.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Self::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }
}

// =============================================================================
// Equality
// =============================================================================

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        use self::Variant::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (SByte(a), SByte(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (UInt16(a), UInt16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (UInt32(a), UInt32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (UInt64(a), UInt64(b)) => a == b,
            // Bit-pattern comparison: NaN equals NaN, -0.0 differs from 0.0.
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Guid(a), Guid(b)) => a == b,
            (ByteString(a), ByteString(b)) => a == b,
            (XmlElement(a), XmlElement(b)) => a == b,
            (NodeId(a), NodeId(b)) => a == b,
            (ExpandedNodeId(a), ExpandedNodeId(b)) => a == b,
            (StatusCode(a), StatusCode(b)) => a == b,
            (QualifiedName(a), QualifiedName(b)) => a == b,
            (LocalizedText(a), LocalizedText(b)) => a == b,
            (ExtensionObject(a), ExtensionObject(b)) => a == b,
            (DataValue(a), DataValue(b)) => a == b,
            (Variant(a), Variant(b)) => a == b,
            (DiagnosticInfo(a), DiagnosticInfo(b)) => a == b,
            (Array(a), Array(b)) => {
                a.element_type.normalized() == b.element_type.normalized() && a.values == b.values
            }
            (Matrix(a), Matrix(b)) => {
                a.element_type.normalized() == b.element_type.normalized()
                    && a.dimensions == b.dimensions
                    && a.elements == b.elements
            }
            _ => false,
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! variant_from_scalar {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for Variant {
                #[inline]
                fn from(value: $source) -> Self {
                    Variant::$variant(value)
                }
            }
        )+
    };
}

variant_from_scalar! {
    bool => Boolean,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
    UaDateTime => DateTime,
    Uuid => Guid,
    ByteString => ByteString,
    StatusCode => StatusCode,
}

macro_rules! variant_from_boxed {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for Variant {
                #[inline]
                fn from(value: $source) -> Self {
                    Variant::$variant(Box::new(value))
                }
            }
        )+
    };
}

variant_from_boxed! {
    NodeId => NodeId,
    ExpandedNodeId => ExpandedNodeId,
    QualifiedName => QualifiedName,
    LocalizedText => LocalizedText,
    ExtensionObject => ExtensionObject,
    DataValue => DataValue,
    DiagnosticInfo => DiagnosticInfo,
}

impl From<&str> for Variant {
    #[inline]
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

/// A byte vector is a `ByteString` scalar, never a `Byte` array. This is the
/// wire-compatibility contract of the original conversion operators.
impl From<Vec<u8>> for Variant {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Variant::ByteString(ByteString::new(value))
    }
}

macro_rules! variant_from_vec {
    ($($source:ty => $builtin:ident / $variant:ident),+ $(,)?) => {
        $(
            impl From<Vec<$source>> for Variant {
                fn from(values: Vec<$source>) -> Self {
                    Variant::Array(Box::new(VariantArray {
                        element_type: BuiltInType::$builtin,
                        values: values.into_iter().map(Variant::$variant).collect(),
                    }))
                }
            }
        )+
    };
}

variant_from_vec! {
    bool => Boolean / Boolean,
    i16 => Int16 / Int16,
    u16 => UInt16 / UInt16,
    i32 => Int32 / Int32,
    u32 => UInt32 / UInt32,
    i64 => Int64 / Int64,
    u64 => UInt64 / UInt64,
    f32 => Float / Float,
    f64 => Double / Double,
    String => String / String,
    // Guid arrays store the wire-native uuid representation directly.
    Uuid => Guid / Guid,
}

impl From<Vec<&str>> for Variant {
    fn from(values: Vec<&str>) -> Self {
        Variant::Array(Box::new(VariantArray {
            element_type: BuiltInType::String,
            values: values
                .into_iter()
                .map(|s| Variant::String(s.to_string()))
                .collect(),
        }))
    }
}

/// A vector of mixed variants becomes a `Variant` array: every element is
/// boxed into its own nested variant.
impl From<Vec<Variant>> for Variant {
    fn from(values: Vec<Variant>) -> Self {
        Variant::Array(Box::new(VariantArray {
            element_type: BuiltInType::Variant,
            values: values
                .into_iter()
                .map(|value| match value {
                    nested @ Variant::Variant(_) => nested,
                    other => Variant::Variant(Box::new(other)),
                })
                .collect(),
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_type_info_derivation() {
        assert_eq!(Variant::from(42u32).type_info(), TypeInfo::scalar(BuiltInType::UInt32));
        assert_eq!(
            Variant::from(vec![1.0f64, 2.0]).type_info(),
            TypeInfo::array(BuiltInType::Double)
        );
        assert_eq!(Variant::Null.type_info(), TypeInfo::NULL);
    }

    #[test]
    fn test_variant_byte_vec_is_byte_string() {
        let value = Variant::from(vec![1u8, 2, 3]);
        assert_eq!(value.type_info(), TypeInfo::scalar(BuiltInType::ByteString));
    }

    #[test]
    fn test_variant_null_semantics() {
        assert!(Variant::Null.is_null());
        // Numerics always hold a concrete bit pattern, never null.
        assert!(!Variant::from(0i32).is_null());
        assert!(!Variant::from(false).is_null());
    }

    #[test]
    fn test_variant_float_bit_pattern_equality() {
        assert_eq!(Variant::from(f64::NAN), Variant::from(f64::NAN));
        assert_eq!(Variant::from(f32::NAN), Variant::from(f32::NAN));
        assert_ne!(Variant::from(0.0f64), Variant::from(-0.0f64));
        assert_eq!(Variant::from(1.5f64), Variant::from(1.5f64));
    }

    #[test]
    fn test_variant_cross_type_inequality() {
        assert_ne!(Variant::from(1i32), Variant::from(1u32));
        assert_ne!(Variant::from(1i32), Variant::Null);
    }

    #[test]
    fn test_variant_enumeration_array_equality() {
        let as_enum = Variant::array(
            BuiltInType::Enumeration,
            vec![Variant::Int32(1), Variant::Int32(2)],
        )
        .unwrap();
        let as_int = Variant::from(vec![1i32, 2]);
        assert_eq!(as_enum, as_int);
    }

    #[test]
    fn test_variant_mixed_vec_boxes_elements() {
        let value = Variant::from(vec![Variant::from(1i32), Variant::from("x")]);
        let array = value.as_array().expect("array");
        assert_eq!(array.element_type, BuiltInType::Variant);
        assert!(matches!(array.values[0], Variant::Variant(_)));
    }

    #[test]
    fn test_variant_default_values() {
        assert_eq!(
            Variant::default_for(TypeInfo::scalar(BuiltInType::UInt32)),
            Variant::UInt32(0)
        );
        assert_eq!(
            Variant::default_for(TypeInfo::scalar(BuiltInType::Enumeration)),
            Variant::Int32(0)
        );
        let empty_array = Variant::default_for(TypeInfo::array(BuiltInType::String));
        assert_eq!(empty_array.as_array().map(|a| a.len()), Some(0));
        let empty_matrix = Variant::default_for(TypeInfo::matrix(BuiltInType::Int32));
        assert_eq!(empty_matrix.as_matrix().map(|m| m.len()), Some(0));
    }

    #[test]
    fn test_variant_with_type_info_sanctioned_aliases() {
        // Byte array declared as ByteString scalar.
        let bytes = Variant::array(
            BuiltInType::Byte,
            vec![Variant::Byte(1), Variant::Byte(2)],
        )
        .unwrap();
        let tagged =
            Variant::with_type_info(bytes, TypeInfo::scalar(BuiltInType::ByteString));
        assert_eq!(tagged.builtin_type(), BuiltInType::Byte);

        // Int32 declared as Enumeration.
        let tagged = Variant::with_type_info(
            Variant::Int32(3),
            TypeInfo::scalar(BuiltInType::Enumeration),
        );
        assert_eq!(tagged, Variant::Int32(3));
    }

    #[test]
    #[should_panic(expected = "variant type mismatch")]
    #[cfg(debug_assertions)]
    fn test_variant_with_type_info_mismatch_asserts() {
        let _ = Variant::with_type_info(
            Variant::from("text"),
            TypeInfo::scalar(BuiltInType::UInt32),
        );
    }

    #[test]
    fn test_variant_deep_clone() {
        let original = Variant::from(vec![Variant::from(1i32), Variant::from("a")]);
        let clone = original.clone();
        assert_eq!(original, clone);
    }
}
