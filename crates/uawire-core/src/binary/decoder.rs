// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary decoder.
//!
//! A [`BinaryDecoder`] is a bounds-checked cursor over a borrowed byte
//! slice. Every read validates the remaining length first; running off the
//! end of a truncated message is a decoding error, never a panic.

use std::str;

use uuid::Uuid;

use crate::binary::wire;
use crate::context::MessageContext;
use crate::error::{EncodingError, EncodingResult};
use crate::matrix::{validate_dimensions, Matrix, VariantArray};
use crate::status::StatusCode;
use crate::types::builtin::BuiltInType;
use crate::types::byte_string::ByteString;
use crate::types::data_value::DataValue;
use crate::types::date_time::UaDateTime;
use crate::types::diagnostic_info::DiagnosticInfo;
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::{ExtensionObject, ExtensionObjectBody};
use crate::types::localized_text::LocalizedText;
use crate::types::node_id::NodeId;
use crate::types::qualified_name::QualifiedName;
use crate::variant::Variant;

/// Reads the data model from the binary wire under a message context's
/// limits.
#[derive(Debug)]
pub struct BinaryDecoder<'a> {
    ctx: &'a MessageContext,
    data: &'a [u8],
    pos: usize,
    nesting: u32,
}

impl<'a> BinaryDecoder<'a> {
    /// Creates a decoder over a message, enforcing the message-size limit.
    pub fn new(ctx: &'a MessageContext, data: &'a [u8]) -> EncodingResult<Self> {
        let limit = ctx.max_message_size;
        if limit > 0 && data.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "message size {} exceeds maximum {limit}",
                data.len()
            )));
        }
        Ok(BinaryDecoder {
            ctx,
            data,
            pos: 0,
            nesting: 0,
        })
    }

    /// Decodes a complete binary message as a single variant.
    pub fn decode_variant(ctx: &MessageContext, data: &[u8]) -> EncodingResult<Variant> {
        BinaryDecoder::new(ctx, data)?.read_variant()
    }

    /// Decodes a complete binary message as a single data value.
    pub fn decode_data_value(ctx: &MessageContext, data: &[u8]) -> EncodingResult<DataValue> {
        BinaryDecoder::new(ctx, data)?.read_data_value()
    }

    /// Returns the number of bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, count: usize) -> EncodingResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(EncodingError::decoding(format!(
                "message truncated: need {count} bytes, {} remain",
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn enter(&mut self) -> EncodingResult<()> {
        self.nesting += 1;
        let limit = self.ctx.max_nesting_levels;
        if limit > 0 && self.nesting > limit {
            self.nesting -= 1;
            return Err(EncodingError::limits_exceeded(format!(
                "nesting depth exceeds maximum {limit}"
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    // =========================================================================
    // Fixed-size scalars
    // =========================================================================

    /// Reads a boolean byte; any non-zero value is `true`.
    pub fn read_boolean(&mut self) -> EncodingResult<bool> {
        Ok(self.read_byte()? != 0)
    }

    /// Reads a signed 8-bit integer.
    pub fn read_sbyte(&mut self) -> EncodingResult<i8> {
        Ok(self.read_byte()? as i8)
    }

    /// Reads an unsigned 8-bit integer.
    pub fn read_byte(&mut self) -> EncodingResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a signed 16-bit integer, little-endian.
    pub fn read_int16(&mut self) -> EncodingResult<i16> {
        let bytes = self.take(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 16-bit integer, little-endian.
    pub fn read_uint16(&mut self) -> EncodingResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a signed 32-bit integer, little-endian.
    pub fn read_int32(&mut self) -> EncodingResult<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an unsigned 32-bit integer, little-endian.
    pub fn read_uint32(&mut self) -> EncodingResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a signed 64-bit integer, little-endian.
    pub fn read_int64(&mut self) -> EncodingResult<i64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    /// Reads an unsigned 64-bit integer, little-endian.
    pub fn read_uint64(&mut self) -> EncodingResult<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Reads an IEEE-754 single, little-endian.
    pub fn read_float(&mut self) -> EncodingResult<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an IEEE-754 double, little-endian.
    pub fn read_double(&mut self) -> EncodingResult<f64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    /// Reads a timestamp from 100 ns ticks since the 1601 epoch, clamped to
    /// the representable range.
    pub fn read_date_time(&mut self) -> EncodingResult<UaDateTime> {
        Ok(UaDateTime::from_ticks(self.read_int64()?))
    }

    /// Reads a status code from its raw 32-bit form.
    pub fn read_status_code(&mut self) -> EncodingResult<StatusCode> {
        Ok(StatusCode::from_bits(self.read_uint32()?))
    }

    /// Reads a guid from its mixed-endian wire layout.
    pub fn read_guid(&mut self) -> EncodingResult<Uuid> {
        let d1 = self.read_uint32()?;
        let d2 = self.read_uint16()?;
        let d3 = self.read_uint16()?;
        let tail = self.take(8)?;
        let mut d4 = [0u8; 8];
        d4.copy_from_slice(tail);
        Ok(Uuid::from_fields(d1, d2, d3, &d4))
    }

    // =========================================================================
    // Length-prefixed runs
    // =========================================================================

    /// Reads a length-prefixed UTF-8 string. A negative length decodes as
    /// the empty string.
    pub fn read_string(&mut self) -> EncodingResult<String> {
        let length = self.read_int32()?;
        if length < 0 {
            return Ok(String::new());
        }
        let length = length as usize;
        let limit = self.ctx.max_string_length;
        if limit > 0 && length > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "string length {length} exceeds maximum {limit}"
            )));
        }
        let bytes = self.take(length)?;
        str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| EncodingError::decoding(format!("invalid utf-8 string: {e}")))
    }

    /// Reads a length-prefixed byte string. A negative length decodes as
    /// empty.
    pub fn read_byte_string(&mut self) -> EncodingResult<ByteString> {
        let length = self.read_int32()?;
        if length < 0 {
            return Ok(ByteString::default());
        }
        let length = length as usize;
        let limit = self.ctx.max_byte_string_length;
        if limit > 0 && length > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "byte string length {length} exceeds maximum {limit}"
            )));
        }
        Ok(ByteString::from(self.take(length)?))
    }

    /// Reads an XML element carried as text.
    pub fn read_xml_element(&mut self) -> EncodingResult<String> {
        self.read_string()
    }

    fn read_array_length(&mut self) -> EncodingResult<usize> {
        let length = self.read_int32()?;
        if length < 0 {
            return Ok(0);
        }
        let length = length as usize;
        let limit = self.ctx.max_array_length;
        if limit > 0 && length > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "array length {length} exceeds maximum {limit}"
            )));
        }
        Ok(length)
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Reads a node id. Expanded flags on the encoding byte are a decoding
    /// error here.
    pub fn read_node_id(&mut self) -> EncodingResult<NodeId> {
        let (node_id, flags) = self.read_node_id_parts()?;
        if flags != 0 {
            return Err(EncodingError::decoding(
                "unexpected expanded flags on a node id",
            ));
        }
        Ok(node_id)
    }

    fn read_node_id_parts(&mut self) -> EncodingResult<(NodeId, u8)> {
        let encoding = self.read_byte()?;
        let flags = encoding & (wire::NODE_ID_NAMESPACE_URI | wire::NODE_ID_SERVER_INDEX);
        let node_id = match encoding & !(wire::NODE_ID_NAMESPACE_URI | wire::NODE_ID_SERVER_INDEX) {
            wire::NODE_ID_TWO_BYTE => NodeId::numeric(0, u32::from(self.read_byte()?)),
            wire::NODE_ID_FOUR_BYTE => {
                let namespace = u16::from(self.read_byte()?);
                NodeId::numeric(namespace, u32::from(self.read_uint16()?))
            }
            wire::NODE_ID_NUMERIC => {
                let namespace = self.read_uint16()?;
                NodeId::numeric(namespace, self.read_uint32()?)
            }
            wire::NODE_ID_STRING => {
                let namespace = self.read_uint16()?;
                NodeId::string(namespace, self.read_string()?)
            }
            wire::NODE_ID_GUID => {
                let namespace = self.read_uint16()?;
                NodeId::guid(namespace, self.read_guid()?)
            }
            wire::NODE_ID_BYTE_STRING => {
                let namespace = self.read_uint16()?;
                NodeId::opaque(namespace, self.read_byte_string()?)
            }
            other => {
                return Err(EncodingError::node_id_invalid(format!(
                    "unknown node id encoding byte 0x{other:02X}"
                )))
            }
        };
        Ok((node_id, flags))
    }

    /// Reads an expanded node id.
    pub fn read_expanded_node_id(&mut self) -> EncodingResult<ExpandedNodeId> {
        let (node_id, flags) = self.read_node_id_parts()?;
        let namespace_uri = if flags & wire::NODE_ID_NAMESPACE_URI != 0 {
            Some(self.read_string()?)
        } else {
            None
        };
        let server_index = if flags & wire::NODE_ID_SERVER_INDEX != 0 {
            self.read_uint32()?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id: if namespace_uri.is_some() {
                node_id.with_namespace(0)
            } else {
                node_id
            },
            namespace_uri,
            server_index,
        })
    }

    /// Reads a qualified name: namespace index then name.
    pub fn read_qualified_name(&mut self) -> EncodingResult<QualifiedName> {
        let namespace = self.read_uint16()?;
        let name = self.read_string()?;
        Ok(QualifiedName { namespace, name })
    }

    /// Reads a localized text from its presence mask.
    pub fn read_localized_text(&mut self) -> EncodingResult<LocalizedText> {
        let mask = self.read_byte()?;
        let locale = if mask & wire::LT_LOCALE != 0 {
            self.read_string()?
        } else {
            String::new()
        };
        let text = if mask & wire::LT_TEXT != 0 {
            self.read_string()?
        } else {
            String::new()
        };
        Ok(LocalizedText { locale, text })
    }

    // =========================================================================
    // Composite values
    // =========================================================================

    /// Reads a variant: encoding byte, body, optional dimension vector.
    pub fn read_variant(&mut self) -> EncodingResult<Variant> {
        self.enter()?;
        let result = self.read_variant_inner();
        self.leave();
        result
    }

    fn read_variant_inner(&mut self) -> EncodingResult<Variant> {
        let encoding = self.read_byte()?;
        if encoding == 0 {
            return Ok(Variant::Null);
        }
        let type_id = encoding & wire::VARIANT_TYPE_MASK;
        let builtin = BuiltInType::from_id(type_id).ok_or_else(|| {
            EncodingError::decoding(format!("unknown built-in type id {type_id}"))
        })?;
        if encoding & wire::VARIANT_ARRAY == 0 {
            return self.read_scalar(builtin);
        }
        let length = self.read_array_length()?;
        let mut elements = Vec::with_capacity(length.min(1024));
        for _ in 0..length {
            elements.push(self.read_scalar(builtin)?);
        }
        if encoding & wire::VARIANT_DIMENSIONS == 0 {
            return Ok(Variant::Array(Box::new(VariantArray {
                element_type: builtin,
                values: elements,
            })));
        }
        let rank = self.read_array_length()?;
        let mut dimensions = Vec::with_capacity(rank.min(64));
        for _ in 0..rank {
            let dim = self.read_int32()?;
            dimensions.push(u32::try_from(dim).map_err(|_| {
                EncodingError::decoding(format!("negative matrix dimension {dim}"))
            })?);
        }
        validate_dimensions(&dimensions, elements.len(), self.ctx.max_array_length)?;
        if dimensions.len() < 2 {
            return Ok(Variant::Array(Box::new(VariantArray {
                element_type: builtin,
                values: elements,
            })));
        }
        Ok(Variant::Matrix(Box::new(Matrix {
            element_type: builtin,
            elements,
            dimensions,
        })))
    }

    fn read_scalar(&mut self, builtin: BuiltInType) -> EncodingResult<Variant> {
        Ok(match builtin.normalized() {
            BuiltInType::Null => Variant::Null,
            BuiltInType::Boolean => Variant::Boolean(self.read_boolean()?),
            BuiltInType::SByte => Variant::SByte(self.read_sbyte()?),
            BuiltInType::Byte => Variant::Byte(self.read_byte()?),
            BuiltInType::Int16 => Variant::Int16(self.read_int16()?),
            BuiltInType::UInt16 => Variant::UInt16(self.read_uint16()?),
            BuiltInType::Int32 => Variant::Int32(self.read_int32()?),
            BuiltInType::UInt32 => Variant::UInt32(self.read_uint32()?),
            BuiltInType::Int64 => Variant::Int64(self.read_int64()?),
            BuiltInType::UInt64 => Variant::UInt64(self.read_uint64()?),
            BuiltInType::Float => Variant::Float(self.read_float()?),
            BuiltInType::Double => Variant::Double(self.read_double()?),
            BuiltInType::String => Variant::String(self.read_string()?),
            BuiltInType::DateTime => Variant::DateTime(self.read_date_time()?),
            BuiltInType::Guid => Variant::Guid(self.read_guid()?),
            BuiltInType::ByteString => Variant::ByteString(self.read_byte_string()?),
            BuiltInType::XmlElement => Variant::XmlElement(self.read_xml_element()?),
            BuiltInType::NodeId => Variant::NodeId(Box::new(self.read_node_id()?)),
            BuiltInType::ExpandedNodeId => {
                Variant::ExpandedNodeId(Box::new(self.read_expanded_node_id()?))
            }
            BuiltInType::StatusCode => Variant::StatusCode(self.read_status_code()?),
            BuiltInType::QualifiedName => {
                Variant::QualifiedName(Box::new(self.read_qualified_name()?))
            }
            BuiltInType::LocalizedText => {
                Variant::LocalizedText(Box::new(self.read_localized_text()?))
            }
            BuiltInType::ExtensionObject => {
                Variant::ExtensionObject(Box::new(self.read_extension_object()?))
            }
            BuiltInType::DataValue => Variant::DataValue(Box::new(self.read_data_value()?)),
            BuiltInType::Variant => Variant::Variant(Box::new(self.read_variant()?)),
            BuiltInType::DiagnosticInfo => {
                Variant::DiagnosticInfo(Box::new(self.read_diagnostic_info()?))
            }
            BuiltInType::Enumeration => unreachable!("Enumeration normalizes to Int32"),
        })
    }

    /// Reads an extension object, resolving binary bodies through the type
    /// registry. Unknown type ids keep the raw body so the object
    /// round-trips unmodified.
    pub fn read_extension_object(&mut self) -> EncodingResult<ExtensionObject> {
        self.enter()?;
        let result = self.read_extension_object_inner();
        self.leave();
        result
    }

    fn read_extension_object_inner(&mut self) -> EncodingResult<ExtensionObject> {
        let type_id = ExpandedNodeId::new(self.read_node_id()?);
        let encoding = self.read_byte()?;
        let body = match encoding {
            wire::BODY_NONE => ExtensionObjectBody::None,
            wire::BODY_BYTE_STRING => {
                let bytes = self.read_byte_string()?;
                match self.ctx.type_registry.lookup_binary(&type_id) {
                    Some(decode) => {
                        let mut inner = BinaryDecoder::new(self.ctx, bytes.as_slice())?;
                        inner.nesting = self.nesting;
                        ExtensionObjectBody::Decoded(decode(&mut inner)?)
                    }
                    None => {
                        tracing::debug!(type_id = %type_id, "no binary decoder registered; keeping raw body");
                        ExtensionObjectBody::Binary(bytes)
                    }
                }
            }
            wire::BODY_XML => ExtensionObjectBody::Xml(self.read_string()?),
            other => {
                return Err(EncodingError::decoding(format!(
                    "unknown extension object encoding {other}"
                )))
            }
        };
        Ok(ExtensionObject { type_id, body })
    }

    /// Reads a data value from its presence mask.
    pub fn read_data_value(&mut self) -> EncodingResult<DataValue> {
        let mask = self.read_byte()?;
        let mut value = DataValue::default();
        if mask & wire::DV_VALUE != 0 {
            value.value = self.read_variant()?;
        }
        if mask & wire::DV_STATUS != 0 {
            value.status = self.read_status_code()?;
        }
        if mask & wire::DV_SOURCE_TIMESTAMP != 0 {
            value.source_timestamp = Some(self.read_date_time()?);
        }
        if mask & wire::DV_SOURCE_PICOSECONDS != 0 {
            value.source_picoseconds = self.read_uint16()?;
        }
        if mask & wire::DV_SERVER_TIMESTAMP != 0 {
            value.server_timestamp = Some(self.read_date_time()?);
        }
        if mask & wire::DV_SERVER_PICOSECONDS != 0 {
            value.server_picoseconds = self.read_uint16()?;
        }
        Ok(value)
    }

    /// Reads a diagnostic info chain; deeper than
    /// [`DiagnosticInfo::MAX_INNER_DEPTH`] is a limit error.
    pub fn read_diagnostic_info(&mut self) -> EncodingResult<DiagnosticInfo> {
        self.read_diagnostic_info_at(0)
    }

    fn read_diagnostic_info_at(&mut self, depth: u32) -> EncodingResult<DiagnosticInfo> {
        if depth > DiagnosticInfo::MAX_INNER_DEPTH {
            return Err(EncodingError::limits_exceeded(format!(
                "diagnostic info nested deeper than {}",
                DiagnosticInfo::MAX_INNER_DEPTH
            )));
        }
        self.enter()?;
        let result = self.read_diagnostic_info_inner(depth);
        self.leave();
        result
    }

    fn read_diagnostic_info_inner(&mut self, depth: u32) -> EncodingResult<DiagnosticInfo> {
        let mask = self.read_byte()?;
        let mut info = DiagnosticInfo::default();
        if mask & wire::DI_SYMBOLIC_ID != 0 {
            info.symbolic_id = Some(self.read_int32()?);
        }
        if mask & wire::DI_NAMESPACE_URI != 0 {
            info.namespace_uri = Some(self.read_int32()?);
        }
        if mask & wire::DI_LOCALIZED_TEXT != 0 {
            info.localized_text = Some(self.read_int32()?);
        }
        if mask & wire::DI_LOCALE != 0 {
            info.locale = Some(self.read_int32()?);
        }
        if mask & wire::DI_ADDITIONAL_INFO != 0 {
            info.additional_info = Some(self.read_string()?);
        }
        if mask & wire::DI_INNER_STATUS_CODE != 0 {
            info.inner_status_code = Some(self.read_status_code()?);
        }
        if mask & wire::DI_INNER_DIAGNOSTIC_INFO != 0 {
            info.inner_diagnostic_info = Some(Box::new(self.read_diagnostic_info_at(depth + 1)?));
        }
        Ok(info)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryEncoder;

    fn round_trip(value: &Variant) -> Variant {
        let ctx = MessageContext::new();
        let bytes = BinaryEncoder::encode_variant(&ctx, value).unwrap();
        BinaryDecoder::decode_variant(&ctx, &bytes).unwrap()
    }

    #[test]
    fn test_binary_scalar_round_trips() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let values = vec![
            Variant::Null,
            Variant::from(true),
            Variant::from(-5i8),
            Variant::from(200u8),
            Variant::from(-12_000i16),
            Variant::from(42u32),
            Variant::from(i64::MIN),
            Variant::from(u64::MAX),
            Variant::from(f32::NAN),
            Variant::from(2.5f64),
            Variant::from("hello"),
            Variant::from(uuid),
            Variant::from(vec![1u8, 2, 3]),
            Variant::from(StatusCode::BAD_TIMEOUT),
        ];
        for value in values {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn test_binary_node_id_round_trips() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let ids = vec![
            NodeId::numeric(0, 85),
            NodeId::numeric(2, 1001),
            NodeId::numeric(300, 70_000),
            NodeId::string(3, "Line1.Motor"),
            NodeId::guid(1, uuid),
            NodeId::opaque(4, vec![1u8, 2, 3, 4]),
        ];
        for id in ids {
            assert_eq!(round_trip(&Variant::from(id.clone())), Variant::from(id));
        }
    }

    #[test]
    fn test_binary_expanded_node_id_round_trips() {
        let ids = vec![
            ExpandedNodeId::new(NodeId::numeric(2, 7)),
            ExpandedNodeId::with_namespace_uri(NodeId::string(0, "Motor"), "urn:factory"),
            ExpandedNodeId::new(NodeId::numeric(1, 9)).with_server_index(3),
        ];
        for id in ids {
            assert_eq!(round_trip(&Variant::from(id.clone())), Variant::from(id));
        }
    }

    #[test]
    fn test_binary_array_and_matrix_round_trips() {
        let array = Variant::from(vec![1i32, -2, 3]);
        assert_eq!(round_trip(&array), array);

        let matrix = Variant::matrix(
            BuiltInType::Double,
            vec![
                Variant::Double(1.0),
                Variant::Double(2.0),
                Variant::Double(3.0),
                Variant::Double(4.0),
                Variant::Double(5.0),
                Variant::Double(6.0),
            ],
            vec![3, 2],
        )
        .unwrap();
        assert_eq!(round_trip(&matrix), matrix);
    }

    #[test]
    fn test_binary_data_value_round_trip() {
        let value = DataValue {
            value: Variant::from(21.5f64),
            status: StatusCode::UNCERTAIN,
            source_timestamp: Some(UaDateTime::from_ticks(1_000_000_000)),
            source_picoseconds: 250,
            server_timestamp: None,
            server_picoseconds: 0,
        };
        let ctx = MessageContext::new();
        let bytes = BinaryEncoder::encode_data_value(&ctx, &value).unwrap();
        assert_eq!(BinaryDecoder::decode_data_value(&ctx, &bytes).unwrap(), value);
    }

    #[test]
    fn test_binary_diagnostic_info_round_trip() {
        let info = DiagnosticInfo {
            symbolic_id: Some(4),
            additional_info: Some("retry".to_string()),
            inner_status_code: Some(StatusCode::BAD_TIMEOUT),
            inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
                symbolic_id: Some(7),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(
            round_trip(&Variant::from(info.clone())),
            Variant::from(info)
        );
    }

    #[test]
    fn test_binary_unknown_extension_object_passthrough() {
        let object = ExtensionObject::binary(
            ExpandedNodeId::new(NodeId::numeric(1, 4000)),
            vec![9u8, 8, 7],
        );
        assert_eq!(
            round_trip(&Variant::from(object.clone())),
            Variant::from(object)
        );
    }

    #[test]
    fn test_binary_truncated_message_fails() {
        let ctx = MessageContext::new();
        let bytes = BinaryEncoder::encode_variant(&ctx, &Variant::from(42u32)).unwrap();
        let result = BinaryDecoder::decode_variant(&ctx, &bytes[..bytes.len() - 1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_binary_matrix_dimension_mismatch_fails() {
        let ctx = MessageContext::new();
        // Int32 matrix claiming 2x3 but carrying 2 elements.
        let mut bytes = vec![6 | 0x80 | 0x40, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0];
        bytes.extend_from_slice(&[2, 0, 0, 0]); // rank
        bytes.extend_from_slice(&[2, 0, 0, 0, 3, 0, 0, 0]);
        assert!(BinaryDecoder::decode_variant(&ctx, &bytes).is_err());
    }

    #[test]
    fn test_binary_string_limit() {
        let ctx = MessageContext::builder().max_string_length(3).build();
        let mut encoder = BinaryEncoder::new(&ctx);
        assert!(encoder.write_string("abcd").is_err());

        // A forged length prefix beyond the limit is rejected on read.
        let forged = [12u8, 100, 0, 0, 0];
        assert!(BinaryDecoder::decode_variant(&ctx, &forged).is_err());
    }
}
