// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JSON encoder.
//!
//! A [`JsonEncoder`] is a stateful cursor over a stack of open JSON
//! containers. Field writers apply the active encoding mode's policy:
//! under the default reversible policy a default-valued field is omitted
//! entirely rather than written as an explicit null or zero — readers treat
//! absence as default, so omission is both a wire-size optimization and a
//! correctness requirement.
//!
//! One encoder serves one message; it owns private mutable state and must
//! not be shared across concurrent operations.
//!
//! # Examples
//!
//! ```
//! use uawire_core::context::MessageContext;
//! use uawire_core::json::{JsonEncoder, JsonEncoding};
//! use uawire_core::variant::Variant;
//!
//! let ctx = MessageContext::new();
//! let text = JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &Variant::from(42u32))
//!     .unwrap();
//! assert_eq!(text, r#"{"Type":7,"Body":42}"#);
//! ```

use serde_json::{Map, Number, Value};

use crate::context::MessageContext;
use crate::error::{EncodingError, EncodingResult};
use crate::json::{field, JsonEncoding, MAX_SAFE_INTEGER};
use crate::matrix::Matrix;
use crate::status::StatusCode;
use crate::types::byte_string::ByteString;
use crate::types::data_value::DataValue;
use crate::types::date_time::UaDateTime;
use crate::types::diagnostic_info::DiagnosticInfo;
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::{Encodeable, ExtensionObject, ExtensionObjectBody};
use crate::types::localized_text::LocalizedText;
use crate::types::node_id::{escape_uri, Identifier, IdType, NodeId};
use crate::types::qualified_name::QualifiedName;
use crate::variant::Variant;

// =============================================================================
// Frames
// =============================================================================

#[derive(Debug)]
enum Container {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

#[derive(Debug)]
struct Frame {
    name: Option<String>,
    container: Container,
}

impl Frame {
    fn object(name: Option<String>) -> Self {
        Frame {
            name,
            container: Container::Object(Map::new()),
        }
    }

    fn array(name: Option<String>) -> Self {
        Frame {
            name,
            container: Container::Array(Vec::new()),
        }
    }

    fn into_value(self) -> Value {
        match self.container {
            Container::Object(map) => Value::Object(map),
            Container::Array(items) => Value::Array(items),
        }
    }
}

// =============================================================================
// JsonEncoder
// =============================================================================

/// Writes the data model to JSON text under a message context's limits.
#[derive(Debug)]
pub struct JsonEncoder<'a> {
    ctx: &'a MessageContext,
    encoding: JsonEncoding,
    stack: Vec<Frame>,
    nesting: u32,
    include_default_values: bool,
    encode_node_id_as_string: bool,
    force_namespace_uri: bool,
    force_namespace_uri_for_index1: bool,
    suppress_artifacts: bool,
}

impl<'a> JsonEncoder<'a> {
    /// Creates an encoder for one message, open at the root object.
    pub fn new(ctx: &'a MessageContext, encoding: JsonEncoding) -> Self {
        let (include_defaults, as_string, force_uri, force_uri_1) = match encoding {
            JsonEncoding::Reversible => (false, false, false, false),
            JsonEncoding::NonReversible => (false, false, true, false),
            JsonEncoding::Compact => (false, true, false, false),
            JsonEncoding::Verbose => (true, true, true, true),
        };
        JsonEncoder {
            ctx,
            encoding,
            stack: vec![Frame::object(None)],
            nesting: 0,
            include_default_values: include_defaults,
            encode_node_id_as_string: as_string,
            force_namespace_uri: force_uri,
            force_namespace_uri_for_index1: force_uri_1,
            suppress_artifacts: false,
        }
    }

    /// Encodes a single variant as a complete JSON document.
    pub fn encode_variant(
        ctx: &MessageContext,
        encoding: JsonEncoding,
        value: &Variant,
    ) -> EncodingResult<String> {
        let mut encoder = JsonEncoder::new(ctx, encoding);
        let json = encoder.variant_value(value)?;
        encoder.check_message_size(&json)
    }

    /// Encodes a single data value as a complete JSON document.
    pub fn encode_data_value(
        ctx: &MessageContext,
        encoding: JsonEncoding,
        value: &DataValue,
    ) -> EncodingResult<String> {
        let mut encoder = JsonEncoder::new(ctx, encoding);
        let json = encoder.data_value_value(value)?;
        encoder.check_message_size(&json)
    }

    /// Returns the active encoding mode.
    #[inline]
    pub fn encoding(&self) -> JsonEncoding {
        self.encoding
    }

    // =========================================================================
    // Policy
    // =========================================================================

    /// Overrides the include-default-values policy.
    ///
    /// Compact and Verbose have fixed policy; mutating them fails with
    /// `BadNotSupported`.
    pub fn set_include_default_values(&mut self, include: bool) -> EncodingResult<()> {
        self.check_mutable_policy()?;
        self.include_default_values = include;
        Ok(())
    }

    /// Overrides whether node ids are written in compact string form.
    pub fn set_encode_node_id_as_string(&mut self, as_string: bool) -> EncodingResult<()> {
        self.check_mutable_policy()?;
        self.encode_node_id_as_string = as_string;
        Ok(())
    }

    /// Overrides whether namespace indexes above the threshold are resolved
    /// to URIs.
    pub fn set_force_namespace_uri(&mut self, force: bool) -> EncodingResult<()> {
        self.check_mutable_policy()?;
        self.force_namespace_uri = force;
        Ok(())
    }

    /// Overrides whether namespace index 1 is also resolved to a URI.
    pub fn set_force_namespace_uri_for_index1(&mut self, force: bool) -> EncodingResult<()> {
        self.check_mutable_policy()?;
        self.force_namespace_uri_for_index1 = force;
        Ok(())
    }

    /// Suppresses the `Ua*` artifact fields of the Compact extension-object
    /// layout, writing bare bodies instead. Mutable in every mode.
    pub fn set_suppress_artifacts(&mut self, suppress: bool) {
        self.suppress_artifacts = suppress;
    }

    fn check_mutable_policy(&self) -> EncodingResult<()> {
        if self.encoding.has_fixed_policy() {
            return Err(EncodingError::not_supported(format!(
                "{:?} encoding has fixed policy",
                self.encoding
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Container management
    // =========================================================================

    /// Opens a nested object under `name`.
    pub fn push_structure(&mut self, name: &str) -> EncodingResult<()> {
        self.enter()?;
        self.stack.push(Frame::object(Some(name.to_string())));
        Ok(())
    }

    /// Closes the current object and writes it into its parent.
    pub fn pop_structure(&mut self) -> EncodingResult<()> {
        self.pop_frame()?;
        self.leave();
        Ok(())
    }

    /// Opens a nested array under `name`.
    pub fn push_array(&mut self, name: &str) -> EncodingResult<()> {
        self.enter()?;
        self.stack.push(Frame::array(Some(name.to_string())));
        Ok(())
    }

    /// Closes the current array and writes it into its parent.
    pub fn pop_array(&mut self) -> EncodingResult<()> {
        self.pop_frame()?;
        self.leave();
        Ok(())
    }

    fn pop_frame(&mut self) -> EncodingResult<()> {
        if self.stack.len() < 2 {
            return Err(EncodingError::encoding("container stack underflow"));
        }
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| EncodingError::encoding("container stack underflow"))?;
        let name = frame.name.clone();
        let value = frame.into_value();
        match name {
            Some(name) => self.insert(&name, value),
            None => Err(EncodingError::encoding("nested container has no field name")),
        }
    }

    /// Serializes the document and enforces the message-size limit.
    pub fn finish(mut self) -> EncodingResult<String> {
        if self.stack.len() != 1 {
            return Err(EncodingError::encoding(format!(
                "{} unclosed containers at end of message",
                self.stack.len() - 1
            )));
        }
        let root = self
            .stack
            .pop()
            .ok_or_else(|| EncodingError::encoding("container stack underflow"))?
            .into_value();
        self.check_message_size(&root)
    }

    fn check_message_size(&self, root: &Value) -> EncodingResult<String> {
        let text = serde_json::to_string(root)
            .map_err(|e| EncodingError::encoding(format!("serialization failed: {e}")))?;
        let limit = self.ctx.max_message_size;
        if limit > 0 && text.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "message size {} exceeds maximum {limit}",
                text.len()
            )));
        }
        Ok(text)
    }

    /// Inserts a raw value into the current container. Field names are
    /// ignored inside arrays.
    fn insert(&mut self, name: &str, value: Value) -> EncodingResult<()> {
        match self.stack.last_mut() {
            Some(frame) => {
                match &mut frame.container {
                    Container::Object(map) => {
                        map.insert(name.to_string(), value);
                    }
                    Container::Array(items) => items.push(value),
                }
                Ok(())
            }
            None => Err(EncodingError::encoding("no open container")),
        }
    }

    /// Returns `true` if a default-valued field should be omitted here.
    fn omit_defaults(&self) -> bool {
        if self.include_default_values {
            return false;
        }
        // Array elements are positional and are never omitted.
        !matches!(
            self.stack.last(),
            Some(Frame {
                container: Container::Array(_),
                ..
            })
        )
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

    /// Builds a value inside a detached object frame and returns it instead
    /// of writing it.
    fn capture<F>(&mut self, build: F) -> EncodingResult<Value>
    where
        F: FnOnce(&mut Self) -> EncodingResult<()>,
    {
        self.stack.push(Frame::object(None));
        let result = build(self);
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| EncodingError::encoding("container stack underflow"))?;
        result?;
        Ok(frame.into_value())
    }

    // =========================================================================
    // Scalar field writers
    // =========================================================================

    /// Writes a boolean field; `false` is omitted under the default policy.
    pub fn write_boolean(&mut self, name: &str, value: bool) -> EncodingResult<()> {
        if !value && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, Value::Bool(value))
    }

    /// Writes a signed 8-bit field.
    pub fn write_sbyte(&mut self, name: &str, value: i8) -> EncodingResult<()> {
        self.write_int32(name, i32::from(value))
    }

    /// Writes an unsigned 8-bit field.
    pub fn write_byte(&mut self, name: &str, value: u8) -> EncodingResult<()> {
        self.write_uint32(name, u32::from(value))
    }

    /// Writes a signed 16-bit field.
    pub fn write_int16(&mut self, name: &str, value: i16) -> EncodingResult<()> {
        self.write_int32(name, i32::from(value))
    }

    /// Writes an unsigned 16-bit field.
    pub fn write_uint16(&mut self, name: &str, value: u16) -> EncodingResult<()> {
        self.write_uint32(name, u32::from(value))
    }

    /// Writes a signed 32-bit field; zero is omitted under the default
    /// policy.
    pub fn write_int32(&mut self, name: &str, value: i32) -> EncodingResult<()> {
        if value == 0 && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, Value::from(value))
    }

    /// Writes an unsigned 32-bit field.
    pub fn write_uint32(&mut self, name: &str, value: u32) -> EncodingResult<()> {
        if value == 0 && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, Value::from(value))
    }

    /// Writes a signed 64-bit field. Values outside the JSON safe-integer
    /// range are string-encoded.
    pub fn write_int64(&mut self, name: &str, value: i64) -> EncodingResult<()> {
        if value == 0 && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, int64_value(value))
    }

    /// Writes an unsigned 64-bit field. Values outside the JSON safe-integer
    /// range are string-encoded.
    pub fn write_uint64(&mut self, name: &str, value: u64) -> EncodingResult<()> {
        if value == 0 && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, uint64_value(value))
    }

    /// Writes a single-precision field. Non-finite values use the literal
    /// `"NaN"` / `"Infinity"` / `"-Infinity"` tokens.
    pub fn write_float(&mut self, name: &str, value: f32) -> EncodingResult<()> {
        if value == 0.0 && value.is_sign_positive() && self.omit_defaults() {
            return Ok(());
        }
        let json = float_value(f64::from(value))?;
        self.insert(name, json)
    }

    /// Writes a double-precision field. Non-finite values use the literal
    /// `"NaN"` / `"Infinity"` / `"-Infinity"` tokens.
    pub fn write_double(&mut self, name: &str, value: f64) -> EncodingResult<()> {
        if value == 0.0 && value.is_sign_positive() && self.omit_defaults() {
            return Ok(());
        }
        let json = float_value(value)?;
        self.insert(name, json)
    }

    /// Writes a string field; empty strings are omitted under the default
    /// policy. Fails when the string exceeds the configured maximum length.
    pub fn write_string(&mut self, name: &str, value: &str) -> EncodingResult<()> {
        if value.is_empty() && self.omit_defaults() {
            return Ok(());
        }
        self.check_string_length(value)?;
        self.insert(name, Value::String(value.to_string()))
    }

    /// Writes a timestamp field; the minimum sentinel is omitted under the
    /// default policy.
    pub fn write_date_time(&mut self, name: &str, value: UaDateTime) -> EncodingResult<()> {
        if value.is_min() && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, Value::String(value.to_wire_string()))
    }

    /// Writes a guid field; the nil guid is omitted under the default
    /// policy.
    pub fn write_guid(&mut self, name: &str, value: uuid::Uuid) -> EncodingResult<()> {
        if value.is_nil() && self.omit_defaults() {
            return Ok(());
        }
        self.insert(name, Value::String(value.to_string()))
    }

    /// Writes a byte-string field as base64; empty is omitted under the
    /// default policy.
    pub fn write_byte_string(&mut self, name: &str, value: &ByteString) -> EncodingResult<()> {
        if value.is_empty() && self.omit_defaults() {
            return Ok(());
        }
        let limit = self.ctx.max_byte_string_length;
        if limit > 0 && value.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "byte string length {} exceeds maximum {limit}",
                value.len()
            )));
        }
        self.insert(name, Value::String(value.to_base64()))
    }

    /// Writes an XML element field carried as text.
    pub fn write_xml_element(&mut self, name: &str, value: &str) -> EncodingResult<()> {
        self.write_string(name, value)
    }

    /// Writes an enumerated field: the bare number when reversible, the
    /// `"Symbol_value"` convention otherwise.
    pub fn write_enumerated(
        &mut self,
        name: &str,
        value: i32,
        symbol: Option<&str>,
    ) -> EncodingResult<()> {
        if value == 0 && self.omit_defaults() {
            return Ok(());
        }
        if self.encoding.is_reversible() {
            return self.insert(name, Value::from(value));
        }
        let text = match symbol {
            Some(symbol) => format!("{symbol}_{value}"),
            None => value.to_string(),
        };
        self.insert(name, Value::String(text))
    }

    // =========================================================================
    // Structured field writers
    // =========================================================================

    /// Writes a status code field: the raw 32-bit code when reversible, a
    /// `{Code, Symbol}` object otherwise. `Good` is omitted under the
    /// default policy.
    pub fn write_status_code(&mut self, name: &str, value: StatusCode) -> EncodingResult<()> {
        if value == StatusCode::GOOD && self.omit_defaults() {
            return Ok(());
        }
        let json = self.status_code_value(value);
        self.insert(name, json)
    }

    /// Writes a node id field.
    pub fn write_node_id(&mut self, name: &str, value: &NodeId) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.node_id_value(value)?;
        self.insert(name, json)
    }

    /// Writes an expanded node id field.
    pub fn write_expanded_node_id(
        &mut self,
        name: &str,
        value: &ExpandedNodeId,
    ) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.expanded_node_id_value(value)?;
        self.insert(name, json)
    }

    /// Writes a qualified name field.
    pub fn write_qualified_name(
        &mut self,
        name: &str,
        value: &QualifiedName,
    ) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.qualified_name_value(value)?;
        self.insert(name, json)
    }

    /// Writes a localized text field: `{Locale, Text}` when reversible, the
    /// bare text otherwise.
    pub fn write_localized_text(
        &mut self,
        name: &str,
        value: &LocalizedText,
    ) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.localized_text_value(value);
        self.insert(name, json)
    }

    /// Writes a variant field; the null variant is omitted under the
    /// default policy.
    pub fn write_variant(&mut self, name: &str, value: &Variant) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.variant_value(value)?;
        self.insert(name, json)
    }

    /// Writes an extension object field.
    pub fn write_extension_object(
        &mut self,
        name: &str,
        value: &ExtensionObject,
    ) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.extension_object_value(value)?;
        self.insert(name, json)
    }

    /// Writes a data value field.
    pub fn write_data_value(&mut self, name: &str, value: &DataValue) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.data_value_value(value)?;
        self.insert(name, json)
    }

    /// Writes a diagnostic info field; chains deeper than
    /// [`DiagnosticInfo::MAX_INNER_DEPTH`] fail with
    /// `BadEncodingLimitsExceeded`.
    pub fn write_diagnostic_info(
        &mut self,
        name: &str,
        value: &DiagnosticInfo,
    ) -> EncodingResult<()> {
        if value.is_null() && self.omit_defaults() {
            return Ok(());
        }
        let json = self.diagnostic_info_value(value, 0)?;
        self.insert(name, json)
    }

    /// Writes a structured value's fields as a nested object field.
    pub fn write_encodeable(
        &mut self,
        name: &str,
        value: &dyn Encodeable,
    ) -> EncodingResult<()> {
        self.enter()?;
        let result = self.capture(|encoder| value.encode_json(encoder));
        self.leave();
        let json = result?;
        self.insert(name, json)
    }

    /// Writes a one-dimensional array of scalar variants. Enforces the
    /// configured maximum array length.
    pub fn write_array(&mut self, name: &str, values: &[Variant]) -> EncodingResult<()> {
        self.check_array_length(values.len())?;
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            items.push(self.element_value(value)?);
        }
        self.insert(name, Value::Array(items))
    }

    // =========================================================================
    // Value builders
    // =========================================================================

    fn status_code_value(&mut self, value: StatusCode) -> Value {
        if self.encoding.is_reversible() {
            return Value::from(value.bits());
        }
        let mut map = Map::new();
        map.insert(field::CODE.to_string(), Value::from(value.bits()));
        if let Some(symbol) = value.symbol() {
            map.insert(field::SYMBOL.to_string(), Value::String(symbol.to_string()));
        }
        Value::Object(map)
    }

    /// Returns `true` when the namespace index should be resolved to a URI.
    /// Index 0 is always written as an index; index 1 only resolves when
    /// separately forced.
    fn should_write_namespace_uri(&self, namespace: u16) -> bool {
        self.force_namespace_uri
            && (namespace > 1 || (namespace == 1 && self.force_namespace_uri_for_index1))
    }

    fn node_id_value(&mut self, value: &NodeId) -> EncodingResult<Value> {
        if self.encode_node_id_as_string {
            return Ok(Value::String(self.node_id_string(value)));
        }
        let mut map = Map::new();
        self.node_id_body(&mut map, value)?;
        Ok(Value::Object(map))
    }

    fn node_id_string(&self, value: &NodeId) -> String {
        if self.should_write_namespace_uri(value.namespace) {
            if let Some(uri) = self.ctx.namespaces.get(value.namespace) {
                return format!("nsu={};{}", escape_uri(uri), value.identifier);
            }
        }
        value.to_string()
    }

    /// Writes the `IdType`/`Id`/`Namespace` triple into `map`.
    fn node_id_body(&mut self, map: &mut Map<String, Value>, value: &NodeId) -> EncodingResult<()> {
        let id_type = value.id_type();
        if id_type != IdType::Numeric {
            map.insert(field::ID_TYPE.to_string(), Value::from(id_type as u8));
        }
        let id = match &value.identifier {
            Identifier::Numeric(v) => Value::from(*v),
            Identifier::String(s) => {
                self.check_string_length(s)?;
                Value::String(s.clone())
            }
            Identifier::Guid(g) => Value::String(g.to_string()),
            Identifier::Opaque(b) => Value::String(b.to_base64()),
        };
        map.insert(field::ID.to_string(), id);
        if value.namespace != 0 {
            if self.should_write_namespace_uri(value.namespace) {
                if let Some(uri) = self.ctx.namespaces.get(value.namespace) {
                    map.insert(field::NAMESPACE.to_string(), Value::String(uri.to_string()));
                    return Ok(());
                }
            }
            map.insert(field::NAMESPACE.to_string(), Value::from(value.namespace));
        }
        Ok(())
    }

    fn expanded_node_id_value(&mut self, value: &ExpandedNodeId) -> EncodingResult<Value> {
        if self.encode_node_id_as_string {
            return Ok(Value::String(value.to_string()));
        }
        let mut map = Map::new();
        self.node_id_body(&mut map, &value.node_id)?;
        if let Some(uri) = &value.namespace_uri {
            map.insert(field::NAMESPACE.to_string(), Value::String(uri.clone()));
        }
        if value.server_index > 0 {
            let server = if self.encoding.is_reversible() {
                Value::from(value.server_index)
            } else {
                match u16::try_from(value.server_index)
                    .ok()
                    .and_then(|i| self.ctx.servers.get(i))
                {
                    Some(uri) => Value::String(uri.to_string()),
                    None => Value::from(value.server_index),
                }
            };
            map.insert(field::SERVER_URI.to_string(), server);
        }
        Ok(Value::Object(map))
    }

    fn qualified_name_value(&mut self, value: &QualifiedName) -> EncodingResult<Value> {
        self.check_string_length(&value.name)?;
        let mut map = Map::new();
        map.insert(field::NAME.to_string(), Value::String(value.name.clone()));
        if value.namespace != 0 {
            if self.should_write_namespace_uri(value.namespace) {
                if let Some(uri) = self.ctx.namespaces.get(value.namespace) {
                    map.insert(field::URI.to_string(), Value::String(uri.to_string()));
                    return Ok(Value::Object(map));
                }
            }
            map.insert(field::URI.to_string(), Value::from(value.namespace));
        }
        Ok(Value::Object(map))
    }

    fn localized_text_value(&mut self, value: &LocalizedText) -> Value {
        if !self.encoding.is_reversible() {
            return Value::String(value.text.clone());
        }
        let mut map = Map::new();
        if !value.locale.is_empty() {
            map.insert(field::LOCALE.to_string(), Value::String(value.locale.clone()));
        }
        if !value.text.is_empty() {
            map.insert(field::TEXT.to_string(), Value::String(value.text.clone()));
        }
        Value::Object(map)
    }

    /// Builds the full wire representation of a variant.
    pub(crate) fn variant_value(&mut self, value: &Variant) -> EncodingResult<Value> {
        self.enter()?;
        let result = self.variant_value_inner(value);
        self.leave();
        result
    }

    fn variant_value_inner(&mut self, value: &Variant) -> EncodingResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if !self.encoding.is_reversible() {
            return self.variant_body_value(value, false);
        }
        // Only the fully reversible layout flattens a matrix body; compact
        // keeps the type tag but mirrors the matrix shape with nested arrays.
        let flat_matrix = self.encoding == JsonEncoding::Reversible;
        let mut map = Map::new();
        map.insert(
            field::TYPE.to_string(),
            Value::from(value.builtin_type().wire_id()),
        );
        map.insert(
            field::BODY.to_string(),
            self.variant_body_value(value, flat_matrix)?,
        );
        if flat_matrix {
            if let Variant::Matrix(matrix) = value {
                let dims: Vec<Value> =
                    matrix.dimensions.iter().map(|&d| Value::from(d)).collect();
                map.insert(field::DIMENSIONS.to_string(), Value::Array(dims));
            }
        }
        Ok(Value::Object(map))
    }

    /// Builds a variant's body. A reversible matrix body is the flattened
    /// element array (dimensions are carried separately); the non-reversible
    /// body mirrors the matrix shape with genuinely nested arrays.
    fn variant_body_value(&mut self, value: &Variant, reversible: bool) -> EncodingResult<Value> {
        match value {
            Variant::Array(array) => {
                self.check_array_length(array.len())?;
                let mut items = Vec::with_capacity(array.len());
                for element in &array.values {
                    items.push(self.element_value(element)?);
                }
                Ok(Value::Array(items))
            }
            Variant::Matrix(matrix) => {
                self.check_array_length(matrix.len())?;
                if reversible {
                    let mut items = Vec::with_capacity(matrix.len());
                    for element in &matrix.elements {
                        items.push(self.element_value(element)?);
                    }
                    Ok(Value::Array(items))
                } else {
                    self.nested_matrix_value(matrix)
                }
            }
            scalar => self.element_value(scalar),
        }
    }

    fn nested_matrix_value(&mut self, matrix: &Matrix) -> EncodingResult<Value> {
        self.nested_matrix_slice(&matrix.elements, &matrix.dimensions)
    }

    fn nested_matrix_slice(
        &mut self,
        elements: &[Variant],
        dimensions: &[u32],
    ) -> EncodingResult<Value> {
        if dimensions.len() <= 1 {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(self.element_value(element)?);
            }
            return Ok(Value::Array(items));
        }
        let outer = dimensions[0] as usize;
        let stride = if outer == 0 { 0 } else { elements.len() / outer };
        let mut rows = Vec::with_capacity(outer);
        for i in 0..outer {
            rows.push(
                self.nested_matrix_slice(&elements[i * stride..(i + 1) * stride], &dimensions[1..])?,
            );
        }
        Ok(Value::Array(rows))
    }

    /// Builds the representation of a single scalar (or nested) element.
    fn element_value(&mut self, value: &Variant) -> EncodingResult<Value> {
        match value {
            Variant::Null => Ok(Value::Null),
            Variant::Boolean(v) => Ok(Value::Bool(*v)),
            Variant::SByte(v) => Ok(Value::from(*v)),
            Variant::Byte(v) => Ok(Value::from(*v)),
            Variant::Int16(v) => Ok(Value::from(*v)),
            Variant::UInt16(v) => Ok(Value::from(*v)),
            Variant::Int32(v) => Ok(Value::from(*v)),
            Variant::UInt32(v) => Ok(Value::from(*v)),
            Variant::Int64(v) => Ok(int64_value(*v)),
            Variant::UInt64(v) => Ok(uint64_value(*v)),
            Variant::Float(v) => float_value(f64::from(*v)),
            Variant::Double(v) => float_value(*v),
            Variant::String(v) => {
                self.check_string_length(v)?;
                Ok(Value::String(v.clone()))
            }
            Variant::DateTime(v) => Ok(Value::String(v.to_wire_string())),
            Variant::Guid(v) => Ok(Value::String(v.to_string())),
            Variant::ByteString(v) => Ok(Value::String(v.to_base64())),
            Variant::XmlElement(v) => {
                self.check_string_length(v)?;
                Ok(Value::String(v.clone()))
            }
            Variant::NodeId(v) => self.node_id_value(v),
            Variant::ExpandedNodeId(v) => self.expanded_node_id_value(v),
            Variant::StatusCode(v) => Ok(self.status_code_value(*v)),
            Variant::QualifiedName(v) => self.qualified_name_value(v),
            Variant::LocalizedText(v) => Ok(self.localized_text_value(v)),
            Variant::ExtensionObject(v) => self.extension_object_value(v),
            Variant::DataValue(v) => self.data_value_value(v),
            Variant::Variant(v) => self.variant_value(v),
            Variant::DiagnosticInfo(v) => self.diagnostic_info_value(v, 0),
            Variant::Array(_) | Variant::Matrix(_) => Err(EncodingError::not_supported(
                "nested bare arrays are carried as nested variants",
            )),
        }
    }

    fn extension_object_value(&mut self, value: &ExtensionObject) -> EncodingResult<Value> {
        self.enter()?;
        let result = self.extension_object_value_inner(value);
        self.leave();
        result
    }

    fn extension_object_value_inner(&mut self, value: &ExtensionObject) -> EncodingResult<Value> {
        let body = match &value.body {
            ExtensionObjectBody::None => Value::Null,
            ExtensionObjectBody::Binary(bytes) => Value::String(bytes.to_base64()),
            ExtensionObjectBody::Xml(xml) => Value::String(xml.clone()),
            ExtensionObjectBody::Json(raw) => raw.clone(),
            ExtensionObjectBody::Decoded(decoded) => {
                self.capture(|encoder| decoded.encode_json(encoder))?
            }
        };

        // Non-reversible output carries the bare body, as does the Compact
        // layout once artifacts are suppressed.
        if !self.encoding.is_reversible()
            || (self.encoding == JsonEncoding::Compact && self.suppress_artifacts)
        {
            return Ok(body);
        }

        let (type_id_field, encoding_field, body_field) = if self.encoding == JsonEncoding::Compact
        {
            (field::UA_TYPE_ID, field::UA_ENCODING, field::UA_BODY)
        } else {
            (field::TYPE_ID, field::ENCODING, field::BODY)
        };

        let mut map = Map::new();
        map.insert(
            type_id_field.to_string(),
            self.expanded_node_id_value(&value.type_id)?,
        );
        let encoding_tag = match &value.body {
            ExtensionObjectBody::Binary(_) => Some(1u8),
            ExtensionObjectBody::Xml(_) => Some(2u8),
            _ => None,
        };
        if let Some(tag) = encoding_tag {
            map.insert(encoding_field.to_string(), Value::from(tag));
        }
        if !matches!(value.body, ExtensionObjectBody::None) {
            map.insert(body_field.to_string(), body);
        }
        Ok(Value::Object(map))
    }

    pub(crate) fn data_value_value(&mut self, value: &DataValue) -> EncodingResult<Value> {
        let mut map = Map::new();
        if !value.value.is_null() || self.include_default_values {
            map.insert(field::VALUE.to_string(), self.variant_value(&value.value)?);
        }
        if value.status != StatusCode::GOOD || self.include_default_values {
            let status = self.status_code_value(value.status);
            map.insert(field::STATUS.to_string(), status);
        }
        if let Some(ts) = value.source_timestamp {
            map.insert(
                field::SOURCE_TIMESTAMP.to_string(),
                Value::String(ts.to_wire_string()),
            );
            if value.source_picoseconds != 0 {
                map.insert(
                    field::SOURCE_PICOSECONDS.to_string(),
                    Value::from(value.source_picoseconds),
                );
            }
        }
        if let Some(ts) = value.server_timestamp {
            map.insert(
                field::SERVER_TIMESTAMP.to_string(),
                Value::String(ts.to_wire_string()),
            );
            if value.server_picoseconds != 0 {
                map.insert(
                    field::SERVER_PICOSECONDS.to_string(),
                    Value::from(value.server_picoseconds),
                );
            }
        }
        Ok(Value::Object(map))
    }

    fn diagnostic_info_value(
        &mut self,
        value: &DiagnosticInfo,
        depth: u32,
    ) -> EncodingResult<Value> {
        if depth > DiagnosticInfo::MAX_INNER_DEPTH {
            return Err(EncodingError::limits_exceeded(format!(
                "diagnostic info nested deeper than {}",
                DiagnosticInfo::MAX_INNER_DEPTH
            )));
        }
        self.enter()?;
        let result = self.diagnostic_info_value_inner(value, depth);
        self.leave();
        result
    }

    fn diagnostic_info_value_inner(
        &mut self,
        value: &DiagnosticInfo,
        depth: u32,
    ) -> EncodingResult<Value> {
        let mut map = Map::new();
        if let Some(v) = value.symbolic_id {
            map.insert(field::SYMBOLIC_ID.to_string(), Value::from(v));
        }
        if let Some(v) = value.namespace_uri {
            map.insert(field::NAMESPACE_URI.to_string(), Value::from(v));
        }
        if let Some(v) = value.locale {
            map.insert(field::LOCALE.to_string(), Value::from(v));
        }
        if let Some(v) = value.localized_text {
            map.insert(field::LOCALIZED_TEXT.to_string(), Value::from(v));
        }
        if let Some(v) = &value.additional_info {
            self.check_string_length(v)?;
            map.insert(field::ADDITIONAL_INFO.to_string(), Value::String(v.clone()));
        }
        if let Some(v) = value.inner_status_code {
            let status = self.status_code_value(v);
            map.insert(field::INNER_STATUS_CODE.to_string(), status);
        }
        if let Some(inner) = &value.inner_diagnostic_info {
            map.insert(
                field::INNER_DIAGNOSTIC_INFO.to_string(),
                self.diagnostic_info_value(inner, depth + 1)?,
            );
        }
        Ok(Value::Object(map))
    }

    // =========================================================================
    // Limit checks
    // =========================================================================

    fn check_string_length(&self, value: &str) -> EncodingResult<()> {
        let limit = self.ctx.max_string_length;
        if limit > 0 && value.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "string length {} exceeds maximum {limit}",
                value.len()
            )));
        }
        Ok(())
    }

    fn check_array_length(&self, length: usize) -> EncodingResult<()> {
        let limit = self.ctx.max_array_length;
        if limit > 0 && length > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "array length {length} exceeds maximum {limit}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Free value builders
// =============================================================================

fn int64_value(value: i64) -> Value {
    if value.unsigned_abs() <= MAX_SAFE_INTEGER {
        Value::from(value)
    } else {
        Value::String(value.to_string())
    }
}

fn uint64_value(value: u64) -> Value {
    if value <= MAX_SAFE_INTEGER {
        Value::from(value)
    } else {
        Value::String(value.to_string())
    }
}

fn float_value(value: f64) -> EncodingResult<Value> {
    if value.is_nan() {
        return Ok(Value::String("NaN".to_string()));
    }
    if value.is_infinite() {
        let literal = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return Ok(Value::String(literal.to_string()));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| EncodingError::encoding("unrepresentable float value"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MessageContext;
    use crate::types::builtin::BuiltInType;

    fn encode(value: &Variant) -> String {
        let ctx = MessageContext::new();
        JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, value).unwrap()
    }

    #[test]
    fn test_encode_uint32_scalar() {
        assert_eq!(encode(&Variant::from(42u32)), r#"{"Type":7,"Body":42}"#);
    }

    #[test]
    fn test_encode_int64_string_form_beyond_safe_range() {
        let value = Variant::from(9_007_199_254_740_993i64);
        assert_eq!(encode(&value), r#"{"Type":8,"Body":"9007199254740993"}"#);
        // Within the safe range, numbers stay numbers.
        assert_eq!(encode(&Variant::from(12i64)), r#"{"Type":8,"Body":12}"#);
    }

    #[test]
    fn test_encode_float_specials() {
        assert_eq!(
            encode(&Variant::from(f64::INFINITY)),
            r#"{"Type":11,"Body":"Infinity"}"#
        );
        assert_eq!(
            encode(&Variant::from(f64::NEG_INFINITY)),
            r#"{"Type":11,"Body":"-Infinity"}"#
        );
        assert_eq!(encode(&Variant::from(f32::NAN)), r#"{"Type":10,"Body":"NaN"}"#);
    }

    #[test]
    fn test_encode_array() {
        let value = Variant::from(vec![1i32, 2, 3]);
        assert_eq!(encode(&value), r#"{"Type":6,"Body":[1,2,3]}"#);
    }

    #[test]
    fn test_encode_matrix_reversible_flat() {
        let elements = (1..=6).map(Variant::Int32).collect();
        let value = Variant::matrix(BuiltInType::Int32, elements, vec![2, 3]).unwrap();
        assert_eq!(
            encode(&value),
            r#"{"Type":6,"Body":[1,2,3,4,5,6],"Dimensions":[2,3]}"#
        );
    }

    #[test]
    fn test_encode_matrix_compact_nested() {
        let ctx = MessageContext::new();
        let elements = (1..=6).map(Variant::Int32).collect();
        let value = Variant::matrix(BuiltInType::Int32, elements, vec![2, 3]).unwrap();
        let mut encoder = JsonEncoder::new(&ctx, JsonEncoding::NonReversible);
        let json = encoder.variant_value(&value).unwrap();
        assert_eq!(json, serde_json::json!([[1, 2, 3], [4, 5, 6]]));
    }

    #[test]
    fn test_default_fields_omitted() {
        let ctx = MessageContext::new();
        let mut encoder = JsonEncoder::new(&ctx, JsonEncoding::Reversible);
        encoder.write_uint32("A", 0).unwrap();
        encoder.write_string("B", "").unwrap();
        encoder.write_boolean("C", false).unwrap();
        encoder.write_uint32("D", 7).unwrap();
        assert_eq!(encoder.finish().unwrap(), r#"{"D":7}"#);
    }

    #[test]
    fn test_defaults_included_when_requested() {
        let ctx = MessageContext::new();
        let mut encoder = JsonEncoder::new(&ctx, JsonEncoding::Reversible);
        encoder.set_include_default_values(true).unwrap();
        encoder.write_uint32("A", 0).unwrap();
        assert_eq!(encoder.finish().unwrap(), r#"{"A":0}"#);
    }

    #[test]
    fn test_fixed_policy_modes_reject_mutation() {
        let ctx = MessageContext::new();
        let mut compact = JsonEncoder::new(&ctx, JsonEncoding::Compact);
        assert!(compact.set_include_default_values(true).is_err());
        let mut verbose = JsonEncoder::new(&ctx, JsonEncoding::Verbose);
        assert!(verbose.set_force_namespace_uri(false).is_err());
    }

    #[test]
    fn test_encode_node_id_object_form() {
        let ctx = MessageContext::new();
        let mut encoder = JsonEncoder::new(&ctx, JsonEncoding::Reversible);
        encoder
            .write_node_id("N", &NodeId::string(3, "ABC"))
            .unwrap();
        assert_eq!(
            encoder.finish().unwrap(),
            r#"{"N":{"IdType":1,"Id":"ABC","Namespace":3}}"#
        );
    }

    #[test]
    fn test_encode_node_id_uri_resolution() {
        let ctx = MessageContext::builder()
            .namespaces(crate::tables::NamespaceTable::from_uris(["urn:app"]))
            .build();
        let mut encoder = JsonEncoder::new(&ctx, JsonEncoding::Reversible);
        encoder.set_force_namespace_uri(true).unwrap();
        encoder.set_force_namespace_uri_for_index1(true).unwrap();
        encoder.write_node_id("N", &NodeId::numeric(1, 5)).unwrap();
        assert_eq!(
            encoder.finish().unwrap(),
            r#"{"N":{"Id":5,"Namespace":"urn:app"}}"#
        );
    }

    #[test]
    fn test_encode_status_code_forms() {
        let ctx = MessageContext::new();
        let mut reversible = JsonEncoder::new(&ctx, JsonEncoding::Reversible);
        reversible
            .write_status_code("S", StatusCode::BAD_TIMEOUT)
            .unwrap();
        assert_eq!(reversible.finish().unwrap(), r#"{"S":2148139008}"#);

        let mut non_reversible = JsonEncoder::new(&ctx, JsonEncoding::NonReversible);
        non_reversible
            .write_status_code("S", StatusCode::BAD_TIMEOUT)
            .unwrap();
        assert_eq!(
            non_reversible.finish().unwrap(),
            r#"{"S":{"Code":2148139008,"Symbol":"BadTimeout"}}"#
        );
    }

    #[test]
    fn test_encode_array_length_limit() {
        let ctx = MessageContext::builder().max_array_length(2).build();
        let value = Variant::from(vec![1i32, 2, 3]);
        let error =
            JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &value).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_encode_nesting_limit() {
        let ctx = MessageContext::builder().max_nesting_levels(3).build();
        let mut value = Variant::from(1i32);
        for _ in 0..5 {
            value = Variant::Variant(Box::new(value));
        }
        let error =
            JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &value).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_encode_message_size_limit() {
        let ctx = MessageContext::builder().max_message_size(8).build();
        let value = Variant::from("a long enough string");
        let error =
            JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &value).unwrap_err();
        assert!(error.is_limit_violation());
    }
}
