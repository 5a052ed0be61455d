// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary encoder.
//!
//! A [`BinaryEncoder`] appends to an owned buffer; [`finish`] enforces the
//! message-size limit and yields the bytes. Field writers take no names —
//! the binary mapping is positional.
//!
//! [`finish`]: BinaryEncoder::finish
//!
//! # Examples
//!
//! ```
//! use uawire_core::binary::BinaryEncoder;
//! use uawire_core::context::MessageContext;
//! use uawire_core::variant::Variant;
//!
//! let ctx = MessageContext::new();
//! let bytes = BinaryEncoder::encode_variant(&ctx, &Variant::from(42u32)).unwrap();
//! assert_eq!(bytes, vec![7, 42, 0, 0, 0]);
//! ```

use uuid::Uuid;

use crate::binary::wire;
use crate::context::MessageContext;
use crate::error::{EncodingError, EncodingResult};
use crate::matrix::Matrix;
use crate::status::StatusCode;
use crate::types::byte_string::ByteString;
use crate::types::data_value::DataValue;
use crate::types::date_time::UaDateTime;
use crate::types::diagnostic_info::DiagnosticInfo;
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::{Encodeable, ExtensionObject, ExtensionObjectBody};
use crate::types::localized_text::LocalizedText;
use crate::types::node_id::{Identifier, NodeId};
use crate::types::qualified_name::QualifiedName;
use crate::variant::Variant;

/// Writes the data model to the binary wire under a message context's
/// limits.
#[derive(Debug)]
pub struct BinaryEncoder<'a> {
    ctx: &'a MessageContext,
    buf: Vec<u8>,
    nesting: u32,
}

impl<'a> BinaryEncoder<'a> {
    /// Creates an encoder with an empty buffer.
    pub fn new(ctx: &'a MessageContext) -> Self {
        BinaryEncoder {
            ctx,
            buf: Vec::new(),
            nesting: 0,
        }
    }

    /// Encodes a single variant as a complete binary message.
    pub fn encode_variant(ctx: &MessageContext, value: &Variant) -> EncodingResult<Vec<u8>> {
        let mut encoder = BinaryEncoder::new(ctx);
        encoder.write_variant(value)?;
        encoder.finish()
    }

    /// Encodes a single data value as a complete binary message.
    pub fn encode_data_value(ctx: &MessageContext, value: &DataValue) -> EncodingResult<Vec<u8>> {
        let mut encoder = BinaryEncoder::new(ctx);
        encoder.write_data_value(value)?;
        encoder.finish()
    }

    /// Returns the buffer, enforcing the message-size limit.
    pub fn finish(self) -> EncodingResult<Vec<u8>> {
        let limit = self.ctx.max_message_size;
        if limit > 0 && self.buf.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "message size {} exceeds maximum {limit}",
                self.buf.len()
            )));
        }
        Ok(self.buf)
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
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

    /// Writes a boolean as one byte.
    pub fn write_boolean(&mut self, value: bool) -> EncodingResult<()> {
        self.buf.push(u8::from(value));
        Ok(())
    }

    /// Writes a signed 8-bit integer.
    pub fn write_sbyte(&mut self, value: i8) -> EncodingResult<()> {
        self.buf.push(value as u8);
        Ok(())
    }

    /// Writes an unsigned 8-bit integer.
    pub fn write_byte(&mut self, value: u8) -> EncodingResult<()> {
        self.buf.push(value);
        Ok(())
    }

    /// Writes a signed 16-bit integer, little-endian.
    pub fn write_int16(&mut self, value: i16) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes an unsigned 16-bit integer, little-endian.
    pub fn write_uint16(&mut self, value: u16) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a signed 32-bit integer, little-endian.
    pub fn write_int32(&mut self, value: i32) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes an unsigned 32-bit integer, little-endian.
    pub fn write_uint32(&mut self, value: u32) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a signed 64-bit integer, little-endian.
    pub fn write_int64(&mut self, value: i64) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes an unsigned 64-bit integer, little-endian.
    pub fn write_uint64(&mut self, value: u64) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes an IEEE-754 single, little-endian.
    pub fn write_float(&mut self, value: f32) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes an IEEE-754 double, little-endian.
    pub fn write_double(&mut self, value: f64) -> EncodingResult<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a timestamp as 100 ns ticks since the 1601 epoch.
    pub fn write_date_time(&mut self, value: UaDateTime) -> EncodingResult<()> {
        self.write_int64(value.ticks())
    }

    /// Writes a status code as its raw 32-bit form.
    pub fn write_status_code(&mut self, value: StatusCode) -> EncodingResult<()> {
        self.write_uint32(value.bits())
    }

    /// Writes a guid in its mixed-endian wire layout.
    pub fn write_guid(&mut self, value: &Uuid) -> EncodingResult<()> {
        let (d1, d2, d3, d4) = value.as_fields();
        self.write_uint32(d1)?;
        self.write_uint16(d2)?;
        self.write_uint16(d3)?;
        self.buf.extend_from_slice(d4);
        Ok(())
    }

    // =========================================================================
    // Length-prefixed runs
    // =========================================================================

    /// Writes a UTF-8 string with an `Int32` byte-length prefix. Enforces
    /// the maximum string length.
    pub fn write_string(&mut self, value: &str) -> EncodingResult<()> {
        let limit = self.ctx.max_string_length;
        if limit > 0 && value.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "string length {} exceeds maximum {limit}",
                value.len()
            )));
        }
        self.write_length(value.len())?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Writes a byte string with an `Int32` length prefix. Enforces the
    /// maximum byte-string length.
    pub fn write_byte_string(&mut self, value: &ByteString) -> EncodingResult<()> {
        let limit = self.ctx.max_byte_string_length;
        if limit > 0 && value.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "byte string length {} exceeds maximum {limit}",
                value.len()
            )));
        }
        self.write_length(value.len())?;
        self.buf.extend_from_slice(value.as_slice());
        Ok(())
    }

    /// Writes an XML element carried as text.
    pub fn write_xml_element(&mut self, value: &str) -> EncodingResult<()> {
        self.write_string(value)
    }

    fn write_length(&mut self, length: usize) -> EncodingResult<()> {
        let length = i32::try_from(length)
            .map_err(|_| EncodingError::limits_exceeded(format!("length {length} exceeds Int32")))?;
        self.write_int32(length)
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Writes a node id in its most compact layout.
    pub fn write_node_id(&mut self, value: &NodeId) -> EncodingResult<()> {
        self.write_node_id_with_flags(value, 0)
    }

    fn write_node_id_with_flags(&mut self, value: &NodeId, flags: u8) -> EncodingResult<()> {
        match &value.identifier {
            Identifier::Numeric(id) => {
                if value.namespace == 0 && *id <= u32::from(u8::MAX) {
                    self.write_byte(wire::NODE_ID_TWO_BYTE | flags)?;
                    self.write_byte(*id as u8)
                } else if value.namespace <= u16::from(u8::MAX) && *id <= u32::from(u16::MAX) {
                    self.write_byte(wire::NODE_ID_FOUR_BYTE | flags)?;
                    self.write_byte(value.namespace as u8)?;
                    self.write_uint16(*id as u16)
                } else {
                    self.write_byte(wire::NODE_ID_NUMERIC | flags)?;
                    self.write_uint16(value.namespace)?;
                    self.write_uint32(*id)
                }
            }
            Identifier::String(id) => {
                self.write_byte(wire::NODE_ID_STRING | flags)?;
                self.write_uint16(value.namespace)?;
                self.write_string(id)
            }
            Identifier::Guid(id) => {
                self.write_byte(wire::NODE_ID_GUID | flags)?;
                self.write_uint16(value.namespace)?;
                self.write_guid(id)
            }
            Identifier::Opaque(id) => {
                self.write_byte(wire::NODE_ID_BYTE_STRING | flags)?;
                self.write_uint16(value.namespace)?;
                self.write_byte_string(id)
            }
        }
    }

    /// Writes an expanded node id: the inner node id with the URI and
    /// server-index flags OR-ed into its encoding byte.
    pub fn write_expanded_node_id(&mut self, value: &ExpandedNodeId) -> EncodingResult<()> {
        let mut flags = 0u8;
        if value.namespace_uri.is_some() {
            flags |= wire::NODE_ID_NAMESPACE_URI;
        }
        if value.server_index > 0 {
            flags |= wire::NODE_ID_SERVER_INDEX;
        }
        self.write_node_id_with_flags(&value.node_id, flags)?;
        if let Some(uri) = &value.namespace_uri {
            self.write_string(uri)?;
        }
        if value.server_index > 0 {
            self.write_uint32(value.server_index)?;
        }
        Ok(())
    }

    /// Writes a qualified name: namespace index then name.
    pub fn write_qualified_name(&mut self, value: &QualifiedName) -> EncodingResult<()> {
        self.write_uint16(value.namespace)?;
        self.write_string(&value.name)
    }

    /// Writes a localized text with its presence mask.
    pub fn write_localized_text(&mut self, value: &LocalizedText) -> EncodingResult<()> {
        let mut mask = 0u8;
        if !value.locale.is_empty() {
            mask |= wire::LT_LOCALE;
        }
        if !value.text.is_empty() {
            mask |= wire::LT_TEXT;
        }
        self.write_byte(mask)?;
        if mask & wire::LT_LOCALE != 0 {
            self.write_string(&value.locale)?;
        }
        if mask & wire::LT_TEXT != 0 {
            self.write_string(&value.text)?;
        }
        Ok(())
    }

    // =========================================================================
    // Composite values
    // =========================================================================

    /// Writes a variant: encoding byte, body, optional dimension vector.
    pub fn write_variant(&mut self, value: &Variant) -> EncodingResult<()> {
        self.enter()?;
        let result = self.write_variant_inner(value);
        self.leave();
        result
    }

    fn write_variant_inner(&mut self, value: &Variant) -> EncodingResult<()> {
        if value.is_null() {
            return self.write_byte(0);
        }
        let type_id = value.builtin_type().wire_id();
        match value {
            Variant::Array(array) => {
                self.write_byte(type_id | wire::VARIANT_ARRAY)?;
                self.write_elements(&array.values)
            }
            Variant::Matrix(matrix) => {
                self.write_byte(type_id | wire::VARIANT_ARRAY | wire::VARIANT_DIMENSIONS)?;
                self.write_elements(&matrix.elements)?;
                self.write_dimensions(matrix)
            }
            scalar => {
                self.write_byte(type_id)?;
                self.write_scalar(scalar)
            }
        }
    }

    fn write_elements(&mut self, elements: &[Variant]) -> EncodingResult<()> {
        let limit = self.ctx.max_array_length;
        if limit > 0 && elements.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "array length {} exceeds maximum {limit}",
                elements.len()
            )));
        }
        self.write_length(elements.len())?;
        for element in elements {
            self.write_scalar(element)?;
        }
        Ok(())
    }

    fn write_dimensions(&mut self, matrix: &Matrix) -> EncodingResult<()> {
        self.write_length(matrix.dimensions.len())?;
        for &dim in &matrix.dimensions {
            self.write_int32(dim as i32)?;
        }
        Ok(())
    }

    fn write_scalar(&mut self, value: &Variant) -> EncodingResult<()> {
        match value {
            // The binary mapping has no per-element null marker.
            Variant::Null => Err(EncodingError::encoding(
                "null element cannot be carried on the binary wire",
            )),
            Variant::Boolean(v) => self.write_boolean(*v),
            Variant::SByte(v) => self.write_sbyte(*v),
            Variant::Byte(v) => self.write_byte(*v),
            Variant::Int16(v) => self.write_int16(*v),
            Variant::UInt16(v) => self.write_uint16(*v),
            Variant::Int32(v) => self.write_int32(*v),
            Variant::UInt32(v) => self.write_uint32(*v),
            Variant::Int64(v) => self.write_int64(*v),
            Variant::UInt64(v) => self.write_uint64(*v),
            Variant::Float(v) => self.write_float(*v),
            Variant::Double(v) => self.write_double(*v),
            Variant::String(v) => self.write_string(v),
            Variant::DateTime(v) => self.write_date_time(*v),
            Variant::Guid(v) => self.write_guid(v),
            Variant::ByteString(v) => self.write_byte_string(v),
            Variant::XmlElement(v) => self.write_xml_element(v),
            Variant::NodeId(v) => self.write_node_id(v),
            Variant::ExpandedNodeId(v) => self.write_expanded_node_id(v),
            Variant::StatusCode(v) => self.write_status_code(*v),
            Variant::QualifiedName(v) => self.write_qualified_name(v),
            Variant::LocalizedText(v) => self.write_localized_text(v),
            Variant::ExtensionObject(v) => self.write_extension_object(v),
            Variant::DataValue(v) => self.write_data_value(v),
            Variant::Variant(v) => self.write_variant(v),
            Variant::DiagnosticInfo(v) => self.write_diagnostic_info(v),
            Variant::Array(_) | Variant::Matrix(_) => Err(EncodingError::not_supported(
                "nested bare arrays are carried as nested variants",
            )),
        }
    }

    /// Writes an extension object: type id, encoding byte, body.
    ///
    /// A decoded body is binary-encoded into a nested buffer first so the
    /// length prefix can be written. A raw JSON body has no binary form and
    /// fails with `BadNotSupported`.
    pub fn write_extension_object(&mut self, value: &ExtensionObject) -> EncodingResult<()> {
        self.enter()?;
        let result = self.write_extension_object_inner(value);
        self.leave();
        result
    }

    fn write_extension_object_inner(&mut self, value: &ExtensionObject) -> EncodingResult<()> {
        self.write_node_id(&value.type_id.node_id)?;
        match &value.body {
            ExtensionObjectBody::None => self.write_byte(wire::BODY_NONE),
            ExtensionObjectBody::Binary(bytes) => {
                self.write_byte(wire::BODY_BYTE_STRING)?;
                self.write_byte_string(bytes)
            }
            ExtensionObjectBody::Xml(xml) => {
                self.write_byte(wire::BODY_XML)?;
                self.write_string(xml)
            }
            ExtensionObjectBody::Decoded(decoded) => {
                let mut body = BinaryEncoder::new(self.ctx);
                body.nesting = self.nesting;
                decoded.encode_binary(&mut body)?;
                self.write_byte(wire::BODY_BYTE_STRING)?;
                self.write_byte_string(&ByteString::new(body.buf))
            }
            ExtensionObjectBody::Json(_) => Err(EncodingError::not_supported(
                "raw JSON body cannot be carried on the binary wire",
            )),
        }
    }

    /// Writes the fields of a structured value as a length-prefixed body.
    pub fn write_encodeable(&mut self, value: &dyn Encodeable) -> EncodingResult<()> {
        self.enter()?;
        let result = value.encode_binary(self);
        self.leave();
        result
    }

    /// Writes a data value with its presence mask.
    pub fn write_data_value(&mut self, value: &DataValue) -> EncodingResult<()> {
        let mut mask = 0u8;
        if !value.value.is_null() {
            mask |= wire::DV_VALUE;
        }
        if value.status != StatusCode::GOOD {
            mask |= wire::DV_STATUS;
        }
        if value.source_timestamp.is_some() {
            mask |= wire::DV_SOURCE_TIMESTAMP;
        }
        if value.server_timestamp.is_some() {
            mask |= wire::DV_SERVER_TIMESTAMP;
        }
        if value.source_picoseconds != 0 {
            mask |= wire::DV_SOURCE_PICOSECONDS;
        }
        if value.server_picoseconds != 0 {
            mask |= wire::DV_SERVER_PICOSECONDS;
        }
        self.write_byte(mask)?;
        if mask & wire::DV_VALUE != 0 {
            self.write_variant(&value.value)?;
        }
        if mask & wire::DV_STATUS != 0 {
            self.write_status_code(value.status)?;
        }
        if let Some(ts) = value.source_timestamp {
            self.write_date_time(ts)?;
        }
        if mask & wire::DV_SOURCE_PICOSECONDS != 0 {
            self.write_uint16(value.source_picoseconds)?;
        }
        if let Some(ts) = value.server_timestamp {
            self.write_date_time(ts)?;
        }
        if mask & wire::DV_SERVER_PICOSECONDS != 0 {
            self.write_uint16(value.server_picoseconds)?;
        }
        Ok(())
    }

    /// Writes a diagnostic info with its presence mask; chains deeper than
    /// [`DiagnosticInfo::MAX_INNER_DEPTH`] fail.
    pub fn write_diagnostic_info(&mut self, value: &DiagnosticInfo) -> EncodingResult<()> {
        self.write_diagnostic_info_at(value, 0)
    }

    fn write_diagnostic_info_at(
        &mut self,
        value: &DiagnosticInfo,
        depth: u32,
    ) -> EncodingResult<()> {
        if depth > DiagnosticInfo::MAX_INNER_DEPTH {
            return Err(EncodingError::limits_exceeded(format!(
                "diagnostic info nested deeper than {}",
                DiagnosticInfo::MAX_INNER_DEPTH
            )));
        }
        self.enter()?;
        let result = self.write_diagnostic_info_inner(value, depth);
        self.leave();
        result
    }

    fn write_diagnostic_info_inner(
        &mut self,
        value: &DiagnosticInfo,
        depth: u32,
    ) -> EncodingResult<()> {
        let mut mask = 0u8;
        if value.symbolic_id.is_some() {
            mask |= wire::DI_SYMBOLIC_ID;
        }
        if value.namespace_uri.is_some() {
            mask |= wire::DI_NAMESPACE_URI;
        }
        if value.localized_text.is_some() {
            mask |= wire::DI_LOCALIZED_TEXT;
        }
        if value.locale.is_some() {
            mask |= wire::DI_LOCALE;
        }
        if value.additional_info.is_some() {
            mask |= wire::DI_ADDITIONAL_INFO;
        }
        if value.inner_status_code.is_some() {
            mask |= wire::DI_INNER_STATUS_CODE;
        }
        if value.inner_diagnostic_info.is_some() {
            mask |= wire::DI_INNER_DIAGNOSTIC_INFO;
        }
        self.write_byte(mask)?;
        if let Some(v) = value.symbolic_id {
            self.write_int32(v)?;
        }
        if let Some(v) = value.namespace_uri {
            self.write_int32(v)?;
        }
        if let Some(v) = value.localized_text {
            self.write_int32(v)?;
        }
        if let Some(v) = value.locale {
            self.write_int32(v)?;
        }
        if let Some(v) = &value.additional_info {
            self.write_string(v)?;
        }
        if let Some(v) = value.inner_status_code {
            self.write_status_code(v)?;
        }
        if let Some(inner) = &value.inner_diagnostic_info {
            self.write_diagnostic_info_at(inner, depth + 1)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Variant) -> Vec<u8> {
        let ctx = MessageContext::new();
        BinaryEncoder::encode_variant(&ctx, value).unwrap()
    }

    #[test]
    fn test_encode_scalar_layouts() {
        assert_eq!(encode(&Variant::Null), vec![0]);
        assert_eq!(encode(&Variant::from(true)), vec![1, 1]);
        assert_eq!(encode(&Variant::from(42u32)), vec![7, 42, 0, 0, 0]);
        assert_eq!(
            encode(&Variant::from(-2i16)),
            vec![4, 0xFE, 0xFF]
        );
    }

    #[test]
    fn test_encode_string_length_prefix() {
        assert_eq!(
            encode(&Variant::from("ab")),
            vec![12, 2, 0, 0, 0, b'a', b'b']
        );
        assert_eq!(encode(&Variant::from("")), vec![12, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_node_id_compact_layouts() {
        // Two-byte layout: ns 0, id <= 255.
        assert_eq!(encode(&Variant::from(NodeId::numeric(0, 85))), vec![17, 0, 85]);
        // Four-byte layout: ns <= 255, id <= 65535.
        assert_eq!(
            encode(&Variant::from(NodeId::numeric(2, 1001))),
            vec![17, 1, 2, 0xE9, 0x03]
        );
        // Full numeric layout.
        assert_eq!(
            encode(&Variant::from(NodeId::numeric(300, 70000))),
            vec![17, 2, 0x2C, 0x01, 0x70, 0x11, 0x01, 0x00]
        );
    }

    #[test]
    fn test_encode_array_with_length() {
        assert_eq!(
            encode(&Variant::from(vec![1i32, 2])),
            vec![6 | 0x80, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_matrix_dimensions_flag() {
        let value = Variant::matrix(
            crate::types::builtin::BuiltInType::Byte,
            vec![Variant::Byte(1), Variant::Byte(2), Variant::Byte(3), Variant::Byte(4)],
            vec![2, 2],
        )
        .unwrap();
        assert_eq!(
            encode(&value),
            vec![
                3 | 0x80 | 0x40,
                4, 0, 0, 0,
                1, 2, 3, 4,
                2, 0, 0, 0,
                2, 0, 0, 0,
                2, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_encode_array_length_limit() {
        let ctx = MessageContext::builder().max_array_length(1).build();
        let error =
            BinaryEncoder::encode_variant(&ctx, &Variant::from(vec![1i32, 2])).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_encode_nesting_limit() {
        let ctx = MessageContext::builder().max_nesting_levels(2).build();
        let mut value = Variant::from(1i32);
        for _ in 0..4 {
            value = Variant::Variant(Box::new(value));
        }
        let error = BinaryEncoder::encode_variant(&ctx, &value).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_encode_json_body_rejected() {
        let ctx = MessageContext::new();
        let object = ExtensionObject::json(
            ExpandedNodeId::new(NodeId::numeric(1, 5)),
            serde_json::json!({"A": 1}),
        );
        let mut encoder = BinaryEncoder::new(&ctx);
        assert!(encoder.write_extension_object(&object).is_err());
    }
}
