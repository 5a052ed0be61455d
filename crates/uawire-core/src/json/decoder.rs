// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JSON decoder.
//!
//! A [`JsonDecoder`] parses one message up front and then walks the tree
//! through a stack of open containers, consuming fields as they are read.
//! An absent or `null` field decodes as the type's default value; only a
//! present field of the wrong shape is an error.
//!
//! The decoder accepts every layout the encoder can produce under the
//! reversible policies, plus the lenient forms needed for interoperability:
//! string-form node ids next to object-form ones, 64-bit integers as either
//! numbers or string tokens, and enumerated values written with the
//! `"Symbol_value"` convention.
//!
//! # Examples
//!
//! ```
//! use uawire_core::context::MessageContext;
//! use uawire_core::json::JsonDecoder;
//! use uawire_core::variant::Variant;
//!
//! let ctx = MessageContext::new();
//! let value = JsonDecoder::decode_variant(&ctx, r#"{"Type":7,"Body":42}"#).unwrap();
//! assert_eq!(value, Variant::from(42u32));
//! ```

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::context::MessageContext;
use crate::error::{EncodingError, EncodingResult};
use crate::json::{field, MAX_SAFE_INTEGER};
use crate::matrix::{validate_dimensions, Matrix, VariantArray};
use crate::status::StatusCode;
use crate::tables::NamespaceTable;
use crate::types::builtin::BuiltInType;
use crate::types::byte_string::ByteString;
use crate::types::data_value::DataValue;
use crate::types::date_time::UaDateTime;
use crate::types::diagnostic_info::DiagnosticInfo;
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::{ExtensionObject, ExtensionObjectBody};
use crate::types::localized_text::LocalizedText;
use crate::types::node_id::{IdType, Identifier, NodeId};
use crate::types::qualified_name::QualifiedName;
use crate::variant::Variant;

// =============================================================================
// Frames
// =============================================================================

#[derive(Debug)]
enum Frame {
    Object(Map<String, Value>),
    Array(std::vec::IntoIter<Value>),
    /// An absent nested container: every read inside yields the default.
    Missing,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// JsonDecoder
// =============================================================================

/// Reads the data model from JSON text under a message context's limits.
#[derive(Debug)]
pub struct JsonDecoder<'a> {
    ctx: &'a MessageContext,
    root: Option<Value>,
    stack: Vec<Frame>,
    nesting: u32,
    namespace_mappings: Option<Vec<u16>>,
    local_namespaces: NamespaceTable,
}

impl<'a> JsonDecoder<'a> {
    /// Parses a message, enforcing the message-size limit before parsing.
    pub fn new(ctx: &'a MessageContext, text: &str) -> EncodingResult<Self> {
        let limit = ctx.max_message_size;
        if limit > 0 && text.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "message size {} exceeds maximum {limit}",
                text.len()
            )));
        }
        let root: Value = serde_json::from_str(text)?;
        Ok(JsonDecoder {
            ctx,
            root: Some(root),
            stack: Vec::new(),
            nesting: 0,
            namespace_mappings: None,
            local_namespaces: ctx.namespaces.clone(),
        })
    }

    /// Decodes a complete JSON document as a single variant.
    pub fn decode_variant(ctx: &MessageContext, text: &str) -> EncodingResult<Variant> {
        let mut decoder = JsonDecoder::new(ctx, text)?;
        let root = decoder.take_root()?;
        decoder.variant_from_value(root)
    }

    /// Decodes a complete JSON document as a single data value.
    pub fn decode_data_value(ctx: &MessageContext, text: &str) -> EncodingResult<DataValue> {
        let mut decoder = JsonDecoder::new(ctx, text)?;
        let root = decoder.take_root()?;
        decoder.data_value_from_value(root)
    }

    // =========================================================================
    // Namespace remapping
    // =========================================================================

    /// Returns the decoder's namespace table. Starts as a copy of the
    /// context's table and grows when [`update_namespace_table`] sees URIs
    /// the context does not know.
    ///
    /// [`update_namespace_table`]: Self::update_namespace_table
    #[inline]
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.local_namespaces
    }

    /// Installs an explicit index-translation vector: an incoming namespace
    /// index `i` becomes `mappings[i]`. An index at or beyond the vector's
    /// length is a decoding error.
    pub fn set_namespace_mappings(&mut self, mappings: Vec<u16>) {
        self.namespace_mappings = Some(mappings);
    }

    /// Rebuilds the translation vector from the sender's namespace table.
    ///
    /// Each URI resolves to its index in the decoder's local table; unknown
    /// URIs are appended, so the sender's indexes always translate. The
    /// context itself is never mutated — callers that want the appended URIs
    /// read them back through [`namespaces`](Self::namespaces).
    pub fn update_namespace_table<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mappings = Vec::new();
        for uri in uris {
            mappings.push(self.local_namespaces.append(uri));
        }
        self.namespace_mappings = Some(mappings);
    }

    fn remap_namespace(&self, raw: u64) -> EncodingResult<u16> {
        let index = u16::try_from(raw)
            .map_err(|_| EncodingError::decoding(format!("namespace index {raw} out of range")))?;
        match &self.namespace_mappings {
            Some(mappings) => mappings.get(usize::from(index)).copied().ok_or_else(|| {
                EncodingError::decoding(format!(
                    "namespace index {index} outside the translation table"
                ))
            }),
            None => Ok(index),
        }
    }

    // =========================================================================
    // Container management
    // =========================================================================

    fn take_root(&mut self) -> EncodingResult<Value> {
        self.root
            .take()
            .ok_or_else(|| EncodingError::decoding("message already consumed"))
    }

    fn ensure_frame(&mut self) -> EncodingResult<()> {
        if !self.stack.is_empty() {
            return Ok(());
        }
        match self.take_root()? {
            Value::Object(map) => {
                self.stack.push(Frame::Object(map));
                Ok(())
            }
            other => Err(EncodingError::decoding(format!(
                "expected an object at the top level, got {}",
                kind(&other)
            ))),
        }
    }

    /// Consumes a field from the current container. Inside an array the
    /// field name is ignored and elements are consumed positionally.
    fn take_field(&mut self, name: &str) -> EncodingResult<Option<Value>> {
        self.ensure_frame()?;
        match self.stack.last_mut() {
            Some(Frame::Object(map)) => Ok(map.remove(name)),
            Some(Frame::Array(items)) => Ok(items.next()),
            Some(Frame::Missing) => Ok(None),
            None => Err(EncodingError::decoding("no open container")),
        }
    }

    /// Opens a nested structure. An absent or null field opens a missing
    /// frame whose reads all yield defaults.
    pub fn push_structure(&mut self, name: &str) -> EncodingResult<()> {
        self.enter()?;
        match self.take_field(name) {
            Ok(Some(Value::Object(map))) => {
                self.stack.push(Frame::Object(map));
                Ok(())
            }
            Ok(None) | Ok(Some(Value::Null)) => {
                self.stack.push(Frame::Missing);
                Ok(())
            }
            Ok(Some(other)) => {
                self.leave();
                Err(EncodingError::decoding(format!(
                    "field '{name}' is {}, expected an object",
                    kind(&other)
                )))
            }
            Err(error) => {
                self.leave();
                Err(error)
            }
        }
    }

    /// Closes the current structure.
    pub fn pop_structure(&mut self) -> EncodingResult<()> {
        self.pop_frame()?;
        self.leave();
        Ok(())
    }

    /// Opens a nested array and returns its element count.
    pub fn push_array(&mut self, name: &str) -> EncodingResult<usize> {
        self.enter()?;
        match self.take_field(name) {
            Ok(Some(Value::Array(items))) => {
                self.check_array_length(items.len())?;
                let length = items.len();
                self.stack.push(Frame::Array(items.into_iter()));
                Ok(length)
            }
            Ok(None) | Ok(Some(Value::Null)) => {
                self.stack.push(Frame::Missing);
                Ok(0)
            }
            Ok(Some(other)) => {
                self.leave();
                Err(EncodingError::decoding(format!(
                    "field '{name}' is {}, expected an array",
                    kind(&other)
                )))
            }
            Err(error) => {
                self.leave();
                Err(error)
            }
        }
    }

    /// Closes the current array.
    pub fn pop_array(&mut self) -> EncodingResult<()> {
        self.pop_frame()?;
        self.leave();
        Ok(())
    }

    fn pop_frame(&mut self) -> EncodingResult<()> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| EncodingError::decoding("container stack underflow"))
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
    // Scalar field readers
    // =========================================================================

    /// Reads a boolean field; absent decodes as `false`.
    pub fn read_boolean(&mut self, name: &str) -> EncodingResult<bool> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(false),
            Some(value) => boolean_from_value(&value, name),
        }
    }

    /// Reads a signed 8-bit field; absent decodes as `0`.
    pub fn read_sbyte(&mut self, name: &str) -> EncodingResult<i8> {
        let wide = self.read_int32(name)?;
        i8::try_from(wide)
            .map_err(|_| EncodingError::decoding(format!("'{name}': {wide} out of SByte range")))
    }

    /// Reads an unsigned 8-bit field; absent decodes as `0`.
    pub fn read_byte(&mut self, name: &str) -> EncodingResult<u8> {
        let wide = self.read_uint32(name)?;
        u8::try_from(wide)
            .map_err(|_| EncodingError::decoding(format!("'{name}': {wide} out of Byte range")))
    }

    /// Reads a signed 16-bit field; absent decodes as `0`.
    pub fn read_int16(&mut self, name: &str) -> EncodingResult<i16> {
        let wide = self.read_int32(name)?;
        i16::try_from(wide)
            .map_err(|_| EncodingError::decoding(format!("'{name}': {wide} out of Int16 range")))
    }

    /// Reads an unsigned 16-bit field; absent decodes as `0`.
    pub fn read_uint16(&mut self, name: &str) -> EncodingResult<u16> {
        let wide = self.read_uint32(name)?;
        u16::try_from(wide)
            .map_err(|_| EncodingError::decoding(format!("'{name}': {wide} out of UInt16 range")))
    }

    /// Reads a signed 32-bit field; absent decodes as `0`.
    pub fn read_int32(&mut self, name: &str) -> EncodingResult<i32> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => int32_from_value(&value, name),
        }
    }

    /// Reads an unsigned 32-bit field; absent decodes as `0`.
    pub fn read_uint32(&mut self, name: &str) -> EncodingResult<u32> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => uint32_from_value(&value, name),
        }
    }

    /// Reads a signed 64-bit field, accepting number or string-token form;
    /// absent decodes as `0`.
    pub fn read_int64(&mut self, name: &str) -> EncodingResult<i64> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => int64_from_value(&value, name),
        }
    }

    /// Reads an unsigned 64-bit field, accepting number or string-token
    /// form; absent decodes as `0`.
    pub fn read_uint64(&mut self, name: &str) -> EncodingResult<u64> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => uint64_from_value(&value, name),
        }
    }

    /// Reads a single-precision field, accepting the non-finite literals;
    /// absent decodes as `0.0`.
    pub fn read_float(&mut self, name: &str) -> EncodingResult<f32> {
        Ok(self.read_double(name)? as f32)
    }

    /// Reads a double-precision field, accepting the non-finite literals;
    /// absent decodes as `0.0`.
    pub fn read_double(&mut self, name: &str) -> EncodingResult<f64> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0.0),
            Some(value) => double_from_value(&value, name),
        }
    }

    /// Reads a string field; absent decodes as the empty string. Enforces
    /// the maximum string length.
    pub fn read_string(&mut self, name: &str) -> EncodingResult<String> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(String::new()),
            Some(value) => self.string_from_value(value, name),
        }
    }

    /// Reads a timestamp field; absent decodes as the minimum sentinel.
    pub fn read_date_time(&mut self, name: &str) -> EncodingResult<UaDateTime> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(UaDateTime::min_value()),
            Some(Value::String(text)) => UaDateTime::parse(&text),
            Some(other) => Err(EncodingError::decoding(format!(
                "field '{name}' is {}, expected a timestamp string",
                kind(&other)
            ))),
        }
    }

    /// Reads a guid field; absent decodes as the nil guid.
    pub fn read_guid(&mut self, name: &str) -> EncodingResult<Uuid> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(Uuid::nil()),
            Some(Value::String(text)) => Ok(Uuid::parse_str(&text)?),
            Some(other) => Err(EncodingError::decoding(format!(
                "field '{name}' is {}, expected a guid string",
                kind(&other)
            ))),
        }
    }

    /// Reads a base64 byte-string field; absent decodes as empty. Enforces
    /// the maximum byte-string length.
    pub fn read_byte_string(&mut self, name: &str) -> EncodingResult<ByteString> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(ByteString::default()),
            Some(Value::String(text)) => self.byte_string_from_base64(&text),
            Some(other) => Err(EncodingError::decoding(format!(
                "field '{name}' is {}, expected a base64 string",
                kind(&other)
            ))),
        }
    }

    /// Reads an XML element field carried as text.
    pub fn read_xml_element(&mut self, name: &str) -> EncodingResult<String> {
        self.read_string(name)
    }

    /// Reads an enumerated field: a bare number, a numeric string, or the
    /// `"Symbol_value"` convention (the value is recovered from the suffix
    /// after the last underscore). Absent decodes as `0`.
    pub fn read_enumerated(&mut self, name: &str) -> EncodingResult<i32> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => enumerated_from_value(&value, name),
        }
    }

    // =========================================================================
    // Structured field readers
    // =========================================================================

    /// Reads a status code field; absent decodes as `Good`.
    pub fn read_status_code(&mut self, name: &str) -> EncodingResult<StatusCode> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(StatusCode::GOOD),
            Some(value) => status_code_from_value(value, name),
        }
    }

    /// Reads a node id field, accepting both the object form and the
    /// compact string form; absent decodes as the null node id.
    pub fn read_node_id(&mut self, name: &str) -> EncodingResult<NodeId> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(NodeId::NULL),
            Some(value) => self.node_id_from_value(value),
        }
    }

    /// Reads an expanded node id field; absent decodes as null.
    pub fn read_expanded_node_id(&mut self, name: &str) -> EncodingResult<ExpandedNodeId> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(ExpandedNodeId::NULL),
            Some(value) => self.expanded_node_id_from_value(value),
        }
    }

    /// Reads a qualified name field, accepting both the object form and the
    /// `<ns>:<name>` text form; absent decodes as null.
    pub fn read_qualified_name(&mut self, name: &str) -> EncodingResult<QualifiedName> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(QualifiedName::default()),
            Some(value) => self.qualified_name_from_value(value),
        }
    }

    /// Reads a localized text field, accepting both the object form and a
    /// bare text string; absent decodes as null.
    pub fn read_localized_text(&mut self, name: &str) -> EncodingResult<LocalizedText> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(LocalizedText::default()),
            Some(value) => self.localized_text_from_value(value),
        }
    }

    /// Reads a variant field; absent decodes as the null variant.
    pub fn read_variant(&mut self, name: &str) -> EncodingResult<Variant> {
        match self.take_field(name)? {
            None => Ok(Variant::Null),
            Some(value) => self.variant_from_value(value),
        }
    }

    /// Reads an extension object field; absent decodes as null.
    pub fn read_extension_object(&mut self, name: &str) -> EncodingResult<ExtensionObject> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(ExtensionObject::null()),
            Some(value) => self.extension_object_from_value(value),
        }
    }

    /// Reads a data value field; absent decodes as null.
    pub fn read_data_value(&mut self, name: &str) -> EncodingResult<DataValue> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(DataValue::default()),
            Some(value) => self.data_value_from_value(value),
        }
    }

    /// Reads a diagnostic info field; chains deeper than
    /// [`DiagnosticInfo::MAX_INNER_DEPTH`] fail with
    /// `BadDecodingError`-family limit errors.
    pub fn read_diagnostic_info(&mut self, name: &str) -> EncodingResult<DiagnosticInfo> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(DiagnosticInfo::default()),
            Some(value) => self.diagnostic_info_from_value(value, 0),
        }
    }

    /// Reads an array field of the given element type.
    ///
    /// Accepts a flat one-dimensional array, the `{Dimensions, Array}`
    /// matrix object, or genuinely nested lists whose shape is inferred —
    /// ragged nested lists are a decoding error.
    pub fn read_array(&mut self, name: &str, element_type: BuiltInType) -> EncodingResult<Variant> {
        match self.take_field(name)? {
            None | Some(Value::Null) => Ok(Variant::Array(Box::new(VariantArray::with_capacity(
                element_type,
                0,
            )))),
            Some(value) => self.array_from_value(element_type, value),
        }
    }

    // =========================================================================
    // Value decoders
    // =========================================================================

    fn string_from_value(&self, value: Value, name: &str) -> EncodingResult<String> {
        match value {
            Value::String(text) => {
                let limit = self.ctx.max_string_length;
                if limit > 0 && text.len() > limit {
                    return Err(EncodingError::limits_exceeded(format!(
                        "string length {} exceeds maximum {limit}",
                        text.len()
                    )));
                }
                Ok(text)
            }
            other => Err(EncodingError::decoding(format!(
                "field '{name}' is {}, expected a string",
                kind(&other)
            ))),
        }
    }

    fn byte_string_from_base64(&self, text: &str) -> EncodingResult<ByteString> {
        let bytes = ByteString::from_base64(text)?;
        let limit = self.ctx.max_byte_string_length;
        if limit > 0 && bytes.len() > limit {
            return Err(EncodingError::limits_exceeded(format!(
                "byte string length {} exceeds maximum {limit}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    fn node_id_from_value(&mut self, value: Value) -> EncodingResult<NodeId> {
        match value {
            Value::String(text) => {
                let expanded = ExpandedNodeId::parse_with_tables(&text, &self.ctx.servers)?;
                if expanded.server_index != 0 {
                    return Err(EncodingError::decoding(format!(
                        "node id '{text}' carries a server index"
                    )));
                }
                match &expanded.namespace_uri {
                    Some(uri) => {
                        let namespace = self.local_namespaces.index_of(uri).ok_or_else(|| {
                            EncodingError::decoding(format!("unknown namespace uri '{uri}'"))
                        })?;
                        Ok(expanded.node_id.with_namespace(namespace))
                    }
                    None => {
                        let namespace =
                            self.remap_namespace(u64::from(expanded.node_id.namespace))?;
                        Ok(expanded.node_id.with_namespace(namespace))
                    }
                }
            }
            Value::Object(mut map) => {
                let identifier = self.identifier_from_fields(&mut map)?;
                let namespace = self.namespace_index_from_fields(&mut map)?;
                Ok(NodeId {
                    namespace,
                    identifier,
                })
            }
            other => Err(EncodingError::decoding(format!(
                "node id is {}, expected a string or object",
                kind(&other)
            ))),
        }
    }

    /// Decodes the `IdType`/`Id` pair.
    ///
    /// A declared `Guid` whose identifier text does not parse as a guid
    /// falls back to a string identifier; strict senders never produce that
    /// shape, lenient peers do.
    fn identifier_from_fields(&self, map: &mut Map<String, Value>) -> EncodingResult<Identifier> {
        let id_type = match map.remove(field::ID_TYPE) {
            None | Some(Value::Null) => IdType::Numeric,
            Some(value) => {
                let raw = uint32_from_value(&value, field::ID_TYPE)?;
                u8::try_from(raw)
                    .ok()
                    .and_then(IdType::from_wire)
                    .ok_or_else(|| {
                        EncodingError::node_id_invalid(format!("unknown id type {raw}"))
                    })?
            }
        };
        let id = map.remove(field::ID);
        match (id_type, id) {
            (IdType::Numeric, None | Some(Value::Null)) => Ok(Identifier::Numeric(0)),
            (IdType::Numeric, Some(value)) => {
                Ok(Identifier::Numeric(uint32_from_value(&value, field::ID)?))
            }
            (IdType::String, None | Some(Value::Null)) => {
                Ok(Identifier::String(String::new()))
            }
            (IdType::String, Some(value)) => {
                Ok(Identifier::String(self.string_from_value(value, field::ID)?))
            }
            (IdType::Guid, None | Some(Value::Null)) => Ok(Identifier::Guid(Uuid::nil())),
            (IdType::Guid, Some(Value::String(text))) => match Uuid::parse_str(&text) {
                Ok(guid) => Ok(Identifier::Guid(guid)),
                Err(_) => Ok(Identifier::String(text)),
            },
            (IdType::Guid, Some(other)) => Err(EncodingError::node_id_invalid(format!(
                "guid identifier is {}, expected a string",
                kind(&other)
            ))),
            (IdType::Opaque, None | Some(Value::Null)) => {
                Ok(Identifier::Opaque(ByteString::default()))
            }
            (IdType::Opaque, Some(Value::String(text))) => {
                Ok(Identifier::Opaque(self.byte_string_from_base64(&text)?))
            }
            (IdType::Opaque, Some(other)) => Err(EncodingError::node_id_invalid(format!(
                "opaque identifier is {}, expected a base64 string",
                kind(&other)
            ))),
        }
    }

    /// Decodes the `Namespace` field into a local index: a number is
    /// translated through the mapping vector, a URI is resolved against the
    /// local table.
    fn namespace_index_from_fields(&self, map: &mut Map<String, Value>) -> EncodingResult<u16> {
        match map.remove(field::NAMESPACE) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => {
                let raw = n.as_u64().ok_or_else(|| {
                    EncodingError::decoding(format!("invalid namespace index {n}"))
                })?;
                self.remap_namespace(raw)
            }
            Some(Value::String(uri)) => self.local_namespaces.index_of(&uri).ok_or_else(|| {
                EncodingError::decoding(format!("unknown namespace uri '{uri}'"))
            }),
            Some(other) => Err(EncodingError::decoding(format!(
                "namespace is {}, expected an index or uri",
                kind(&other)
            ))),
        }
    }

    fn expanded_node_id_from_value(&mut self, value: Value) -> EncodingResult<ExpandedNodeId> {
        let expanded = match value {
            Value::String(text) => {
                let mut parsed = ExpandedNodeId::parse_with_tables(&text, &self.ctx.servers)?;
                // Resolve the URI to a local index when the table knows it.
                if let Some(index) = parsed
                    .namespace_uri
                    .as_deref()
                    .and_then(|uri| self.local_namespaces.index_of(uri))
                {
                    parsed.node_id = parsed.node_id.with_namespace(index);
                    parsed.namespace_uri = None;
                } else if parsed.namespace_uri.is_none() {
                    let namespace = self.remap_namespace(u64::from(parsed.node_id.namespace))?;
                    parsed.node_id = parsed.node_id.with_namespace(namespace);
                }
                parsed
            }
            Value::Object(mut map) => {
                let identifier = self.identifier_from_fields(&mut map)?;
                let (namespace, namespace_uri) = match map.remove(field::NAMESPACE) {
                    None | Some(Value::Null) => (0, None),
                    Some(Value::Number(n)) => {
                        let raw = n.as_u64().ok_or_else(|| {
                            EncodingError::decoding(format!("invalid namespace index {n}"))
                        })?;
                        (self.remap_namespace(raw)?, None)
                    }
                    // A URI the local table knows becomes an index; an
                    // unknown one stays an explicit URI.
                    Some(Value::String(uri)) => match self.local_namespaces.index_of(&uri) {
                        Some(index) => (index, None),
                        None => (0, Some(uri)),
                    },
                    Some(other) => {
                        return Err(EncodingError::decoding(format!(
                            "namespace is {}, expected an index or uri",
                            kind(&other)
                        )))
                    }
                };
                let server_index = match map.remove(field::SERVER_URI) {
                    None | Some(Value::Null) => 0,
                    Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(
                        || EncodingError::decoding(format!("invalid server index {n}")),
                    )?,
                    Some(Value::String(uri)) => {
                        u32::from(self.ctx.servers.index_of(&uri).ok_or_else(|| {
                            EncodingError::decoding(format!("unknown server uri '{uri}'"))
                        })?)
                    }
                    Some(other) => {
                        return Err(EncodingError::decoding(format!(
                            "server uri is {}, expected an index or uri",
                            kind(&other)
                        )))
                    }
                };
                ExpandedNodeId {
                    node_id: NodeId {
                        namespace,
                        identifier,
                    },
                    namespace_uri,
                    server_index,
                }
            }
            other => {
                return Err(EncodingError::decoding(format!(
                    "expanded node id is {}, expected a string or object",
                    kind(&other)
                )))
            }
        };
        Ok(expanded)
    }

    fn qualified_name_from_value(&mut self, value: Value) -> EncodingResult<QualifiedName> {
        match value {
            Value::String(text) => QualifiedName::parse(&text),
            Value::Object(mut map) => {
                let name = match map.remove(field::NAME) {
                    None | Some(Value::Null) => String::new(),
                    Some(value) => self.string_from_value(value, field::NAME)?,
                };
                let namespace = match map.remove(field::URI) {
                    None | Some(Value::Null) => 0,
                    Some(Value::Number(n)) => {
                        let raw = n.as_u64().ok_or_else(|| {
                            EncodingError::decoding(format!("invalid namespace index {n}"))
                        })?;
                        self.remap_namespace(raw)?
                    }
                    Some(Value::String(uri)) => {
                        self.local_namespaces.index_of(&uri).ok_or_else(|| {
                            EncodingError::decoding(format!("unknown namespace uri '{uri}'"))
                        })?
                    }
                    Some(other) => {
                        return Err(EncodingError::decoding(format!(
                            "qualified name uri is {}, expected an index or uri",
                            kind(&other)
                        )))
                    }
                };
                Ok(QualifiedName { namespace, name })
            }
            other => Err(EncodingError::decoding(format!(
                "qualified name is {}, expected a string or object",
                kind(&other)
            ))),
        }
    }

    fn localized_text_from_value(&mut self, value: Value) -> EncodingResult<LocalizedText> {
        match value {
            Value::String(text) => Ok(LocalizedText::from_text(text)),
            Value::Object(mut map) => {
                let locale = match map.remove(field::LOCALE) {
                    None | Some(Value::Null) => String::new(),
                    Some(value) => self.string_from_value(value, field::LOCALE)?,
                };
                let text = match map.remove(field::TEXT) {
                    None | Some(Value::Null) => String::new(),
                    Some(value) => self.string_from_value(value, field::TEXT)?,
                };
                Ok(LocalizedText { locale, text })
            }
            other => Err(EncodingError::decoding(format!(
                "localized text is {}, expected a string or object",
                kind(&other)
            ))),
        }
    }

    /// Decodes the full `{Type, Body, Dimensions}` variant envelope.
    pub(crate) fn variant_from_value(&mut self, value: Value) -> EncodingResult<Variant> {
        self.enter()?;
        let result = self.variant_from_value_inner(value);
        self.leave();
        result
    }

    fn variant_from_value_inner(&mut self, value: Value) -> EncodingResult<Variant> {
        let mut map = match value {
            Value::Null => return Ok(Variant::Null),
            Value::Object(map) => map,
            other => {
                return Err(EncodingError::decoding(format!(
                    "variant is {}, expected an object with a Type field",
                    kind(&other)
                )))
            }
        };
        let type_id = match map.remove(field::TYPE) {
            Some(value) => {
                let raw = uint32_from_value(&value, field::TYPE)?;
                u8::try_from(raw)
                    .ok()
                    .and_then(BuiltInType::from_id)
                    .ok_or_else(|| {
                        EncodingError::decoding(format!("unknown built-in type id {raw}"))
                    })?
            }
            None => {
                return Err(EncodingError::decoding(
                    "variant object has no Type field",
                ))
            }
        };
        if type_id == BuiltInType::Null {
            return Ok(Variant::Null);
        }
        let dimensions = match map.remove(field::DIMENSIONS) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut dims = Vec::with_capacity(items.len());
                for item in items {
                    dims.push(uint32_from_value(&item, field::DIMENSIONS)?);
                }
                Some(dims)
            }
            Some(other) => {
                return Err(EncodingError::decoding(format!(
                    "variant dimensions are {}, expected an array",
                    kind(&other)
                )))
            }
        };
        let body_present = map.contains_key(field::BODY);
        let body = map.remove(field::BODY).unwrap_or(Value::Null);
        match body {
            Value::Array(items) => {
                self.check_array_length(items.len())?;
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.scalar_from_value(type_id, item)?);
                }
                match dimensions {
                    Some(dims) if dims.len() >= 2 => {
                        validate_dimensions(&dims, elements.len(), self.ctx.max_array_length)?;
                        Ok(Variant::Matrix(Box::new(Matrix {
                            element_type: type_id,
                            elements,
                            dimensions: dims,
                        })))
                    }
                    Some(dims) => {
                        validate_dimensions(&dims, elements.len(), self.ctx.max_array_length)?;
                        Ok(Variant::Array(Box::new(VariantArray {
                            element_type: type_id,
                            values: elements,
                        })))
                    }
                    None => Ok(Variant::Array(Box::new(VariantArray {
                        element_type: type_id,
                        values: elements,
                    }))),
                }
            }
            Value::Null if !body_present => {
                // Absent body decodes as the type's default scalar.
                Ok(Variant::default_for(crate::types::builtin::TypeInfo::scalar(
                    type_id,
                )))
            }
            scalar => self.scalar_from_value(type_id, scalar),
        }
    }

    /// Decodes one scalar of a known built-in type. Inside arrays a JSON
    /// `null` element stays a null variant.
    fn scalar_from_value(&mut self, builtin: BuiltInType, value: Value) -> EncodingResult<Variant> {
        if value.is_null() {
            return Ok(Variant::Null);
        }
        let what = "Body";
        Ok(match builtin.normalized() {
            BuiltInType::Null => Variant::Null,
            BuiltInType::Boolean => Variant::Boolean(boolean_from_value(&value, what)?),
            BuiltInType::SByte => {
                let wide = int32_from_value(&value, what)?;
                Variant::SByte(i8::try_from(wide).map_err(|_| {
                    EncodingError::decoding(format!("{wide} out of SByte range"))
                })?)
            }
            BuiltInType::Byte => {
                let wide = uint32_from_value(&value, what)?;
                Variant::Byte(u8::try_from(wide).map_err(|_| {
                    EncodingError::decoding(format!("{wide} out of Byte range"))
                })?)
            }
            BuiltInType::Int16 => {
                let wide = int32_from_value(&value, what)?;
                Variant::Int16(i16::try_from(wide).map_err(|_| {
                    EncodingError::decoding(format!("{wide} out of Int16 range"))
                })?)
            }
            BuiltInType::UInt16 => {
                let wide = uint32_from_value(&value, what)?;
                Variant::UInt16(u16::try_from(wide).map_err(|_| {
                    EncodingError::decoding(format!("{wide} out of UInt16 range"))
                })?)
            }
            BuiltInType::Int32 => Variant::Int32(int32_from_value(&value, what)?),
            BuiltInType::UInt32 => Variant::UInt32(uint32_from_value(&value, what)?),
            BuiltInType::Int64 => Variant::Int64(int64_from_value(&value, what)?),
            BuiltInType::UInt64 => Variant::UInt64(uint64_from_value(&value, what)?),
            BuiltInType::Float => Variant::Float(double_from_value(&value, what)? as f32),
            BuiltInType::Double => Variant::Double(double_from_value(&value, what)?),
            BuiltInType::String => Variant::String(self.string_from_value(value, what)?),
            BuiltInType::DateTime => match value {
                Value::String(text) => Variant::DateTime(UaDateTime::parse(&text)?),
                other => {
                    return Err(EncodingError::decoding(format!(
                        "timestamp is {}, expected a string",
                        kind(&other)
                    )))
                }
            },
            BuiltInType::Guid => match value {
                Value::String(text) => Variant::Guid(Uuid::parse_str(&text)?),
                other => {
                    return Err(EncodingError::decoding(format!(
                        "guid is {}, expected a string",
                        kind(&other)
                    )))
                }
            },
            BuiltInType::ByteString => match value {
                Value::String(text) => Variant::ByteString(self.byte_string_from_base64(&text)?),
                other => {
                    return Err(EncodingError::decoding(format!(
                        "byte string is {}, expected a base64 string",
                        kind(&other)
                    )))
                }
            },
            BuiltInType::XmlElement => Variant::XmlElement(self.string_from_value(value, what)?),
            BuiltInType::NodeId => Variant::NodeId(Box::new(self.node_id_from_value(value)?)),
            BuiltInType::ExpandedNodeId => {
                Variant::ExpandedNodeId(Box::new(self.expanded_node_id_from_value(value)?))
            }
            BuiltInType::StatusCode => Variant::StatusCode(status_code_from_value(value, what)?),
            BuiltInType::QualifiedName => {
                Variant::QualifiedName(Box::new(self.qualified_name_from_value(value)?))
            }
            BuiltInType::LocalizedText => {
                Variant::LocalizedText(Box::new(self.localized_text_from_value(value)?))
            }
            BuiltInType::ExtensionObject => {
                Variant::ExtensionObject(Box::new(self.extension_object_from_value(value)?))
            }
            BuiltInType::DataValue => {
                Variant::DataValue(Box::new(self.data_value_from_value(value)?))
            }
            BuiltInType::Variant => Variant::Variant(Box::new(self.variant_from_value(value)?)),
            BuiltInType::DiagnosticInfo => {
                Variant::DiagnosticInfo(Box::new(self.diagnostic_info_from_value(value, 0)?))
            }
            BuiltInType::Enumeration => unreachable!("Enumeration normalizes to Int32"),
        })
    }

    fn array_from_value(
        &mut self,
        element_type: BuiltInType,
        value: Value,
    ) -> EncodingResult<Variant> {
        match value {
            Value::Array(items) => {
                if items.first().is_some_and(Value::is_array) {
                    return self.matrix_from_nested(element_type, items);
                }
                self.check_array_length(items.len())?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.scalar_from_value(element_type, item)?);
                }
                Ok(Variant::Array(Box::new(VariantArray {
                    element_type,
                    values,
                })))
            }
            Value::Object(mut map) => {
                let dims = match map.remove(field::DIMENSIONS) {
                    Some(Value::Array(items)) => {
                        let mut dims = Vec::with_capacity(items.len());
                        for item in items {
                            dims.push(uint32_from_value(&item, field::DIMENSIONS)?);
                        }
                        dims
                    }
                    _ => {
                        return Err(EncodingError::decoding(
                            "matrix object has no Dimensions field",
                        ))
                    }
                };
                let flat = match map.remove(field::ARRAY) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => {
                        return Err(EncodingError::decoding(format!(
                            "matrix array is {}, expected an array",
                            kind(&other)
                        )))
                    }
                };
                validate_dimensions(&dims, flat.len(), self.ctx.max_array_length)?;
                let mut elements = Vec::with_capacity(flat.len());
                for item in flat {
                    elements.push(self.scalar_from_value(element_type, item)?);
                }
                Ok(Variant::Matrix(Box::new(Matrix {
                    element_type,
                    elements,
                    dimensions: dims,
                })))
            }
            other => Err(EncodingError::decoding(format!(
                "array is {}, expected an array or matrix object",
                kind(&other)
            ))),
        }
    }

    /// Flattens genuinely nested lists into a matrix, inferring dimensions
    /// from the first row at each level and rejecting ragged shapes.
    fn matrix_from_nested(
        &mut self,
        element_type: BuiltInType,
        items: Vec<Value>,
    ) -> EncodingResult<Variant> {
        let mut dimensions = Vec::new();
        let mut elements = Vec::new();
        self.flatten_nested(element_type, items, 0, &mut dimensions, &mut elements)?;
        validate_dimensions(&dimensions, elements.len(), self.ctx.max_array_length)?;
        if dimensions.len() < 2 {
            return Ok(Variant::Array(Box::new(VariantArray {
                element_type,
                values: elements,
            })));
        }
        Ok(Variant::Matrix(Box::new(Matrix {
            element_type,
            elements,
            dimensions,
        })))
    }

    fn flatten_nested(
        &mut self,
        element_type: BuiltInType,
        items: Vec<Value>,
        level: usize,
        dimensions: &mut Vec<u32>,
        elements: &mut Vec<Variant>,
    ) -> EncodingResult<()> {
        if dimensions.len() == level {
            dimensions.push(items.len() as u32);
        } else if dimensions[level] as usize != items.len() {
            return Err(EncodingError::decoding(format!(
                "ragged nested array: row of {} elements where {} were expected",
                items.len(),
                dimensions[level]
            )));
        }
        let nested = items.first().is_some_and(Value::is_array);
        for item in items {
            match (nested, item) {
                (true, Value::Array(inner)) => {
                    self.flatten_nested(element_type, inner, level + 1, dimensions, elements)?;
                }
                (true, other) | (false, other @ Value::Array(_)) => {
                    return Err(EncodingError::decoding(format!(
                        "ragged nested array: {} at depth {level}",
                        kind(&other)
                    )));
                }
                (false, leaf) => elements.push(self.scalar_from_value(element_type, leaf)?),
            }
        }
        Ok(())
    }

    fn extension_object_from_value(&mut self, value: Value) -> EncodingResult<ExtensionObject> {
        self.enter()?;
        let result = self.extension_object_from_value_inner(value);
        self.leave();
        result
    }

    fn extension_object_from_value_inner(
        &mut self,
        value: Value,
    ) -> EncodingResult<ExtensionObject> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(EncodingError::decoding(format!(
                    "extension object is {}, expected an object",
                    kind(&other)
                )))
            }
        };
        // Compact wire layout uses the Ua*-prefixed field names.
        let compact = map.contains_key(field::UA_TYPE_ID);
        let (type_id_field, encoding_field, body_field) = if compact {
            (field::UA_TYPE_ID, field::UA_ENCODING, field::UA_BODY)
        } else {
            (field::TYPE_ID, field::ENCODING, field::BODY)
        };
        let type_id = match map.remove(type_id_field) {
            Some(value) => self.expanded_node_id_from_value(value)?,
            None => {
                return Err(EncodingError::decoding(
                    "extension object has no TypeId field",
                ))
            }
        };
        let encoding = match map.remove(encoding_field) {
            None | Some(Value::Null) => 0,
            Some(value) => uint32_from_value(&value, encoding_field)?,
        };
        let body = match (encoding, map.remove(body_field)) {
            (_, None) | (_, Some(Value::Null)) => ExtensionObjectBody::None,
            (1, Some(Value::String(text))) => {
                ExtensionObjectBody::Binary(self.byte_string_from_base64(&text)?)
            }
            (1, Some(other)) => {
                return Err(EncodingError::decoding(format!(
                    "binary body is {}, expected a base64 string",
                    kind(&other)
                )))
            }
            (2, Some(Value::String(text))) => ExtensionObjectBody::Xml(text),
            (2, Some(other)) => {
                return Err(EncodingError::decoding(format!(
                    "xml body is {}, expected a string",
                    kind(&other)
                )))
            }
            (0, Some(body)) => self.decode_structured_body(&type_id, body)?,
            (tag, _) => {
                return Err(EncodingError::decoding(format!(
                    "unknown extension object encoding {tag}"
                )))
            }
        };
        Ok(ExtensionObject { type_id, body })
    }

    /// Resolves a JSON body through the type registry; unknown type ids keep
    /// the raw JSON so the object round-trips unmodified.
    fn decode_structured_body(
        &mut self,
        type_id: &ExpandedNodeId,
        body: Value,
    ) -> EncodingResult<ExtensionObjectBody> {
        match (self.ctx.type_registry.lookup_json(type_id), body) {
            (Some(decode), Value::Object(map)) => {
                self.stack.push(Frame::Object(map));
                let decoded = decode(self);
                self.pop_frame()?;
                Ok(ExtensionObjectBody::Decoded(decoded?))
            }
            (_, body) => {
                debug!(type_id = %type_id, "no decoder registered, preserving raw body");
                Ok(ExtensionObjectBody::Json(body))
            }
        }
    }

    fn data_value_from_value(&mut self, value: Value) -> EncodingResult<DataValue> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(EncodingError::decoding(format!(
                    "data value is {}, expected an object",
                    kind(&other)
                )))
            }
        };
        let value = match map.remove(field::VALUE) {
            None => Variant::Null,
            Some(value) => self.variant_from_value(value)?,
        };
        let status = match map.remove(field::STATUS) {
            None | Some(Value::Null) => StatusCode::GOOD,
            Some(value) => status_code_from_value(value, field::STATUS)?,
        };
        let source_timestamp = self.timestamp_from_fields(&mut map, field::SOURCE_TIMESTAMP)?;
        let server_timestamp = self.timestamp_from_fields(&mut map, field::SERVER_TIMESTAMP)?;
        let source_picoseconds = picoseconds_from_fields(&mut map, field::SOURCE_PICOSECONDS)?;
        let server_picoseconds = picoseconds_from_fields(&mut map, field::SERVER_PICOSECONDS)?;
        Ok(DataValue {
            value,
            status,
            source_timestamp,
            source_picoseconds,
            server_timestamp,
            server_picoseconds,
        })
    }

    fn timestamp_from_fields(
        &self,
        map: &mut Map<String, Value>,
        name: &str,
    ) -> EncodingResult<Option<UaDateTime>> {
        match map.remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(UaDateTime::parse(&text)?)),
            Some(other) => Err(EncodingError::decoding(format!(
                "field '{name}' is {}, expected a timestamp string",
                kind(&other)
            ))),
        }
    }

    fn diagnostic_info_from_value(
        &mut self,
        value: Value,
        depth: u32,
    ) -> EncodingResult<DiagnosticInfo> {
        if depth > DiagnosticInfo::MAX_INNER_DEPTH {
            return Err(EncodingError::limits_exceeded(format!(
                "diagnostic info nested deeper than {}",
                DiagnosticInfo::MAX_INNER_DEPTH
            )));
        }
        self.enter()?;
        let result = self.diagnostic_info_from_value_inner(value, depth);
        self.leave();
        result
    }

    fn diagnostic_info_from_value_inner(
        &mut self,
        value: Value,
        depth: u32,
    ) -> EncodingResult<DiagnosticInfo> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(EncodingError::decoding(format!(
                    "diagnostic info is {}, expected an object",
                    kind(&other)
                )))
            }
        };
        let mut info = DiagnosticInfo::default();
        info.symbolic_id = optional_int32_from_fields(&mut map, field::SYMBOLIC_ID)?;
        info.namespace_uri = optional_int32_from_fields(&mut map, field::NAMESPACE_URI)?;
        info.locale = optional_int32_from_fields(&mut map, field::LOCALE)?;
        info.localized_text = optional_int32_from_fields(&mut map, field::LOCALIZED_TEXT)?;
        info.additional_info = match map.remove(field::ADDITIONAL_INFO) {
            None | Some(Value::Null) => None,
            Some(value) => Some(self.string_from_value(value, field::ADDITIONAL_INFO)?),
        };
        info.inner_status_code = match map.remove(field::INNER_STATUS_CODE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(status_code_from_value(value, field::INNER_STATUS_CODE)?),
        };
        info.inner_diagnostic_info = match map.remove(field::INNER_DIAGNOSTIC_INFO) {
            None | Some(Value::Null) => None,
            Some(value) => Some(Box::new(self.diagnostic_info_from_value(value, depth + 1)?)),
        };
        Ok(info)
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
// Free value decoders
// =============================================================================

fn boolean_from_value(value: &Value, name: &str) -> EncodingResult<bool> {
    value.as_bool().ok_or_else(|| {
        EncodingError::decoding(format!(
            "field '{name}' is {}, expected a boolean",
            kind(value)
        ))
    })
}

fn int32_from_value(value: &Value, name: &str) -> EncodingResult<i32> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| {
            EncodingError::decoding(format!(
                "field '{name}' is {}, expected an Int32",
                kind(value)
            ))
        })
}

fn uint32_from_value(value: &Value, name: &str) -> EncodingResult<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            EncodingError::decoding(format!(
                "field '{name}' is {}, expected a UInt32",
                kind(value)
            ))
        })
}

fn int64_from_value(value: &Value, name: &str) -> EncodingResult<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|v| v.unsigned_abs() <= MAX_SAFE_INTEGER),
        Value::String(text) => text.parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        EncodingError::decoding(format!(
            "field '{name}' is {}, expected an Int64 number or string",
            kind(value)
        ))
    })
}

fn uint64_from_value(value: &Value, name: &str) -> EncodingResult<u64> {
    match value {
        Value::Number(n) => n.as_u64().filter(|v| *v <= MAX_SAFE_INTEGER),
        Value::String(text) => text.parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        EncodingError::decoding(format!(
            "field '{name}' is {}, expected a UInt64 number or string",
            kind(value)
        ))
    })
}

fn double_from_value(value: &Value, name: &str) -> EncodingResult<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => match text.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
    .ok_or_else(|| {
        EncodingError::decoding(format!(
            "field '{name}' is {}, expected a number or float literal",
            kind(value)
        ))
    })
}

fn status_code_from_value(value: Value, name: &str) -> EncodingResult<StatusCode> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(StatusCode::from_bits)
            .ok_or_else(|| EncodingError::decoding(format!("invalid status code {n}"))),
        Value::Object(mut map) => match map.remove(field::CODE) {
            None | Some(Value::Null) => Ok(StatusCode::GOOD),
            Some(code) => {
                Ok(StatusCode::from_bits(uint32_from_value(&code, field::CODE)?))
            }
        },
        other => Err(EncodingError::decoding(format!(
            "field '{name}' is {}, expected a status code",
            kind(&other)
        ))),
    }
}

fn enumerated_from_value(value: &Value, name: &str) -> EncodingResult<i32> {
    match value {
        Value::Number(_) => int32_from_value(value, name),
        Value::String(text) => {
            if let Ok(parsed) = text.parse::<i32>() {
                return Ok(parsed);
            }
            text.rsplit_once('_')
                .and_then(|(_, suffix)| suffix.parse::<i32>().ok())
                .ok_or_else(|| {
                    EncodingError::decoding(format!(
                        "field '{name}': '{text}' is not an enumerated value"
                    ))
                })
        }
        other => Err(EncodingError::decoding(format!(
            "field '{name}' is {}, expected an enumerated value",
            kind(other)
        ))),
    }
}

fn optional_int32_from_fields(
    map: &mut Map<String, Value>,
    name: &str,
) -> EncodingResult<Option<i32>> {
    match map.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(int32_from_value(&value, name)?)),
    }
}

fn picoseconds_from_fields(map: &mut Map<String, Value>, name: &str) -> EncodingResult<u16> {
    match map.remove(name) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => {
            let wide = uint32_from_value(&value, name)?;
            u16::try_from(wide).map_err(|_| {
                EncodingError::decoding(format!("'{name}': {wide} out of picosecond range"))
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{JsonEncoder, JsonEncoding};

    fn decode(text: &str) -> Variant {
        let ctx = MessageContext::new();
        JsonDecoder::decode_variant(&ctx, text).unwrap()
    }

    #[test]
    fn test_decode_uint32_scalar() {
        assert_eq!(decode(r#"{"Type":7,"Body":42}"#), Variant::from(42u32));
    }

    #[test]
    fn test_decode_absent_body_is_default() {
        assert_eq!(decode(r#"{"Type":7}"#), Variant::from(0u32));
        assert_eq!(decode(r#"{"Type":12}"#), Variant::from(""));
    }

    #[test]
    fn test_decode_int64_string_token() {
        assert_eq!(
            decode(r#"{"Type":8,"Body":"9007199254740993"}"#),
            Variant::from(9_007_199_254_740_993i64)
        );
        assert_eq!(decode(r#"{"Type":8,"Body":12}"#), Variant::from(12i64));
    }

    #[test]
    fn test_decode_float_literals() {
        assert_eq!(
            decode(r#"{"Type":11,"Body":"Infinity"}"#),
            Variant::from(f64::INFINITY)
        );
        assert_eq!(
            decode(r#"{"Type":11,"Body":"NaN"}"#),
            Variant::from(f64::NAN)
        );
    }

    #[test]
    fn test_decode_array_and_matrix() {
        assert_eq!(
            decode(r#"{"Type":6,"Body":[1,2,3]}"#),
            Variant::from(vec![1i32, 2, 3])
        );
        let matrix = decode(r#"{"Type":6,"Body":[1,2,3,4,5,6],"Dimensions":[2,3]}"#);
        let matrix = matrix.as_matrix().expect("matrix");
        assert_eq!(matrix.dimensions, vec![2, 3]);
        assert_eq!(matrix.elements.len(), 6);
    }

    #[test]
    fn test_decode_matrix_dimension_mismatch() {
        let ctx = MessageContext::new();
        let result =
            JsonDecoder::decode_variant(&ctx, r#"{"Type":6,"Body":[1,2,3],"Dimensions":[2,3]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_variant_without_type_fails() {
        let ctx = MessageContext::new();
        assert!(JsonDecoder::decode_variant(&ctx, r#"{"Body":42}"#).is_err());
    }

    #[test]
    fn test_decode_node_id_with_namespace_mapping() {
        let ctx = MessageContext::new();
        let mut decoder =
            JsonDecoder::new(&ctx, r#"{"Type":17,"Body":{"Id":1001,"Namespace":3}}"#).unwrap();
        decoder.set_namespace_mappings(vec![0, 5, 2, 9]);
        let root = decoder.take_root().unwrap();
        let value = decoder.variant_from_value(root).unwrap();
        assert_eq!(value, Variant::from(NodeId::numeric(9, 1001)));
    }

    #[test]
    fn test_decode_node_id_mapping_out_of_range() {
        let ctx = MessageContext::new();
        let mut decoder =
            JsonDecoder::new(&ctx, r#"{"Type":17,"Body":{"Id":1,"Namespace":4}}"#).unwrap();
        decoder.set_namespace_mappings(vec![0, 5, 2, 9]);
        let root = decoder.take_root().unwrap();
        assert!(decoder.variant_from_value(root).is_err());
    }

    #[test]
    fn test_decode_guid_id_type_falls_back_to_string() {
        // A declared guid identifier that does not parse as a guid decodes
        // leniently as a string identifier.
        let value = decode(r#"{"Type":17,"Body":{"Id":"ABC","IdType":2}}"#);
        assert_eq!(value, Variant::from(NodeId::string(0, "ABC")));

        let guid = decode(
            r#"{"Type":17,"Body":{"Id":"550e8400-e29b-41d4-a716-446655440000","IdType":2}}"#,
        );
        let expected = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(guid, Variant::from(NodeId::guid(0, expected)));
    }

    #[test]
    fn test_decode_node_id_string_form() {
        let value = decode(r#"{"Type":17,"Body":"ns=2;s=Motor"}"#);
        assert_eq!(value, Variant::from(NodeId::string(2, "Motor")));
    }

    #[test]
    fn test_update_namespace_table_appends_unknown_uris() {
        let ctx = MessageContext::builder()
            .namespaces(NamespaceTable::from_uris(["urn:known"]))
            .build();
        let mut decoder =
            JsonDecoder::new(&ctx, r#"{"Type":17,"Body":{"Id":1,"Namespace":2}}"#).unwrap();
        decoder.update_namespace_table([
            crate::tables::STANDARD_NAMESPACE_URI,
            "urn:known",
            "urn:new",
        ]);
        // Sender index 2 is urn:new, appended at local index 2.
        assert_eq!(decoder.namespaces().index_of("urn:new"), Some(2));
        let root = decoder.take_root().unwrap();
        let value = decoder.variant_from_value(root).unwrap();
        assert_eq!(value, Variant::from(NodeId::numeric(2, 1)));
    }

    #[test]
    fn test_decode_nesting_boundary() {
        let ctx = MessageContext::builder().max_nesting_levels(3).build();
        // Depth exactly at the limit decodes.
        let at_limit = r#"{"Type":24,"Body":{"Type":24,"Body":{"Type":6,"Body":1}}}"#;
        assert!(JsonDecoder::decode_variant(&ctx, at_limit).is_ok());
        // One level deeper fails.
        let beyond =
            r#"{"Type":24,"Body":{"Type":24,"Body":{"Type":24,"Body":{"Type":6,"Body":1}}}}"#;
        let error = JsonDecoder::decode_variant(&ctx, beyond).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_decode_unknown_extension_object_round_trips() {
        let text = r#"{"Type":22,"Body":{"TypeId":{"Id":99,"Namespace":1},"Body":{"A":1}}}"#;
        let value = decode(text);
        let Variant::ExtensionObject(object) = value else {
            panic!("expected an extension object");
        };
        assert_eq!(
            object.body,
            ExtensionObjectBody::Json(serde_json::json!({"A": 1}))
        );

        // The preserved body re-encodes unmodified.
        let ctx = MessageContext::new();
        let encoded = JsonEncoder::encode_variant(
            &ctx,
            JsonEncoding::Reversible,
            &Variant::ExtensionObject(object),
        )
        .unwrap();
        assert!(encoded.contains(r#""Body":{"A":1}"#));
    }

    #[test]
    fn test_decode_enumerated_forms() {
        let ctx = MessageContext::new();
        let mut decoder =
            JsonDecoder::new(&ctx, r#"{"A":3,"B":"7","C":"Running_2","D":"bogus"}"#).unwrap();
        assert_eq!(decoder.read_enumerated("A").unwrap(), 3);
        assert_eq!(decoder.read_enumerated("B").unwrap(), 7);
        assert_eq!(decoder.read_enumerated("C").unwrap(), 2);
        assert!(decoder.read_enumerated("D").is_err());
        assert_eq!(decoder.read_enumerated("Absent").unwrap(), 0);
    }

    #[test]
    fn test_read_array_nested_inference() {
        let ctx = MessageContext::new();
        let mut decoder = JsonDecoder::new(&ctx, r#"{"M":[[1,2,3],[4,5,6]]}"#).unwrap();
        let value = decoder.read_array("M", BuiltInType::Int32).unwrap();
        let matrix = value.as_matrix().expect("matrix");
        assert_eq!(matrix.dimensions, vec![2, 3]);
        assert_eq!(matrix.elements[4], Variant::Int32(5));
    }

    #[test]
    fn test_read_array_ragged_rejected() {
        let ctx = MessageContext::new();
        let mut decoder = JsonDecoder::new(&ctx, r#"{"M":[[1,2],[3]]}"#).unwrap();
        assert!(decoder.read_array("M", BuiltInType::Int32).is_err());

        let mut decoder = JsonDecoder::new(&ctx, r#"{"M":[[1,2],3]}"#).unwrap();
        assert!(decoder.read_array("M", BuiltInType::Int32).is_err());
    }

    #[test]
    fn test_decode_message_size_limit() {
        let ctx = MessageContext::builder().max_message_size(8).build();
        let error = JsonDecoder::new(&ctx, r#"{"Type":7,"Body":42}"#).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_decode_absent_fields_are_defaults() {
        let ctx = MessageContext::new();
        let mut decoder = JsonDecoder::new(&ctx, r#"{"Present":5}"#).unwrap();
        assert_eq!(decoder.read_uint32("Present").unwrap(), 5);
        assert_eq!(decoder.read_uint32("Absent").unwrap(), 0);
        assert_eq!(decoder.read_string("Absent").unwrap(), "");
        assert!(!decoder.read_boolean("Absent").unwrap());
        assert!(decoder.read_date_time("Absent").unwrap().is_min());
        assert_eq!(decoder.read_node_id("Absent").unwrap(), NodeId::NULL);
    }

    #[test]
    fn test_round_trip_reversible() {
        let ctx = MessageContext::new();
        let values = vec![
            Variant::from(true),
            Variant::from(-12i16),
            Variant::from(3.25f64),
            Variant::from("hello"),
            Variant::from(vec![1u8, 2, 3]),
            Variant::from(NodeId::string(2, "Motor")),
            Variant::from(StatusCode::BAD_TIMEOUT),
            Variant::from(vec!["a", "b"]),
            Variant::matrix(
                BuiltInType::Double,
                vec![
                    Variant::Double(1.0),
                    Variant::Double(2.0),
                    Variant::Double(3.0),
                    Variant::Double(4.0),
                ],
                vec![2, 2],
            )
            .unwrap(),
        ];
        for value in values {
            let text =
                JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &value).unwrap();
            let decoded = JsonDecoder::decode_variant(&ctx, &text).unwrap();
            assert_eq!(decoded, value, "round trip failed for {text}");
        }
    }
}
