// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-message encoding context.
//!
//! A [`MessageContext`] carries everything an encoder or decoder is
//! parameterized by: the encoding limits, the active namespace and server
//! URI tables, and the [`TypeRegistry`] that resolves extension-object type
//! ids to decode functions. Contexts are plain values — there is no global
//! mutable default; every encode/decode operation receives its context
//! explicitly.
//!
//! # Examples
//!
//! ```
//! use uawire_core::context::MessageContext;
//!
//! let ctx = MessageContext::builder()
//!     .max_array_length(10_000)
//!     .max_nesting_levels(32)
//!     .build();
//! assert_eq!(ctx.max_array_length, 10_000);
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::binary::BinaryDecoder;
use crate::error::EncodingResult;
use crate::json::JsonDecoder;
use crate::tables::{NamespaceTable, StringTable};
use crate::types::expanded_node_id::ExpandedNodeId;
use crate::types::extension_object::Encodeable;

/// Default maximum serialized message size in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum decoded string length in bytes.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1024 * 1024;

/// Default maximum decoded byte-string length in bytes.
pub const DEFAULT_MAX_BYTE_STRING_LENGTH: usize = 1024 * 1024;

/// Default maximum array length in elements.
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 65_535;

/// Default maximum nesting depth for recursive structures.
pub const DEFAULT_MAX_NESTING_LEVELS: u32 = 100;

// =============================================================================
// TypeRegistry
// =============================================================================

/// Decodes a registered type from the decoder's current JSON structure.
pub type JsonDecodeFn = fn(&mut JsonDecoder<'_>) -> EncodingResult<Box<dyn Encodeable>>;

/// Decodes a registered type from the binary stream.
pub type BinaryDecodeFn = fn(&mut BinaryDecoder<'_>) -> EncodingResult<Box<dyn Encodeable>>;

/// Maps extension-object type ids to decode functions.
///
/// A type id with no entry is not an error: decoders preserve the raw body
/// unmodified so unknown types round-trip.
#[derive(Default, Clone)]
pub struct TypeRegistry {
    json: HashMap<ExpandedNodeId, JsonDecodeFn>,
    binary: HashMap<ExpandedNodeId, BinaryDecodeFn>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Registers a JSON decode function for a type id.
    pub fn register_json(&mut self, type_id: ExpandedNodeId, decode: JsonDecodeFn) {
        self.json.insert(type_id, decode);
    }

    /// Registers a binary decode function for a type id.
    pub fn register_binary(&mut self, type_id: ExpandedNodeId, decode: BinaryDecodeFn) {
        self.binary.insert(type_id, decode);
    }

    /// Looks up the JSON decode function for a type id.
    pub fn lookup_json(&self, type_id: &ExpandedNodeId) -> Option<JsonDecodeFn> {
        self.json.get(type_id).copied()
    }

    /// Looks up the binary decode function for a type id.
    pub fn lookup_binary(&self, type_id: &ExpandedNodeId) -> Option<BinaryDecodeFn> {
        self.binary.get(type_id).copied()
    }

    /// Returns the number of registered type ids.
    pub fn len(&self) -> usize {
        self.json.len() + self.binary.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.json.is_empty() && self.binary.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("json_types", &self.json.len())
            .field("binary_types", &self.binary.len())
            .finish()
    }
}

// =============================================================================
// MessageContext
// =============================================================================

/// Limits, URI tables and type factory for one encode/decode operation.
///
/// Size limits of zero mean unlimited; `max_nesting_levels` of zero disables
/// the depth check (not recommended for untrusted input — the nesting cap is
/// the defense against stack exhaustion from adversarial messages).
#[derive(Debug, Clone)]
pub struct MessageContext {
    /// Maximum serialized message size in bytes.
    pub max_message_size: usize,
    /// Maximum decoded string length in bytes.
    pub max_string_length: usize,
    /// Maximum decoded byte-string length in bytes.
    pub max_byte_string_length: usize,
    /// Maximum array length in elements.
    pub max_array_length: usize,
    /// Maximum nesting depth for variants, extension objects, diagnostics
    /// and matrices.
    pub max_nesting_levels: u32,
    /// The active namespace URI table.
    pub namespaces: NamespaceTable,
    /// The active server URI table.
    pub servers: StringTable,
    /// Resolves extension-object type ids to decode functions.
    pub type_registry: TypeRegistry,
}

impl MessageContext {
    /// Creates a context with default limits and empty tables.
    pub fn new() -> Self {
        MessageContext {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_byte_string_length: DEFAULT_MAX_BYTE_STRING_LENGTH,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            max_nesting_levels: DEFAULT_MAX_NESTING_LEVELS,
            namespaces: NamespaceTable::new(),
            servers: StringTable::new(),
            type_registry: TypeRegistry::new(),
        }
    }

    /// Returns a builder with default limits.
    #[inline]
    pub fn builder() -> MessageContextBuilder {
        MessageContextBuilder::new()
    }
}

impl Default for MessageContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MessageContextBuilder
// =============================================================================

/// Builder for [`MessageContext`].
#[derive(Debug, Clone)]
pub struct MessageContextBuilder {
    context: MessageContext,
}

impl MessageContextBuilder {
    /// Creates a builder with default limits and empty tables.
    pub fn new() -> Self {
        MessageContextBuilder {
            context: MessageContext::new(),
        }
    }

    /// Sets the maximum serialized message size (0 = unlimited).
    pub fn max_message_size(mut self, limit: usize) -> Self {
        self.context.max_message_size = limit;
        self
    }

    /// Sets the maximum decoded string length (0 = unlimited).
    pub fn max_string_length(mut self, limit: usize) -> Self {
        self.context.max_string_length = limit;
        self
    }

    /// Sets the maximum decoded byte-string length (0 = unlimited).
    pub fn max_byte_string_length(mut self, limit: usize) -> Self {
        self.context.max_byte_string_length = limit;
        self
    }

    /// Sets the maximum array length in elements (0 = unlimited).
    pub fn max_array_length(mut self, limit: usize) -> Self {
        self.context.max_array_length = limit;
        self
    }

    /// Sets the maximum nesting depth.
    pub fn max_nesting_levels(mut self, limit: u32) -> Self {
        self.context.max_nesting_levels = limit;
        self
    }

    /// Sets the namespace URI table.
    pub fn namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.context.namespaces = namespaces;
        self
    }

    /// Sets the server URI table.
    pub fn servers(mut self, servers: StringTable) -> Self {
        self.context.servers = servers;
        self
    }

    /// Sets the type registry.
    pub fn type_registry(mut self, registry: TypeRegistry) -> Self {
        self.context.type_registry = registry;
        self
    }

    /// Builds the context.
    pub fn build(self) -> MessageContext {
        self.context
    }
}

impl Default for MessageContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node_id::NodeId;

    #[test]
    fn test_context_defaults() {
        let ctx = MessageContext::new();
        assert_eq!(ctx.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(ctx.max_nesting_levels, DEFAULT_MAX_NESTING_LEVELS);
        assert_eq!(ctx.namespaces.len(), 1);
        assert!(ctx.type_registry.is_empty());
    }

    #[test]
    fn test_context_builder() {
        let ctx = MessageContext::builder()
            .max_array_length(10)
            .max_nesting_levels(3)
            .namespaces(NamespaceTable::from_uris(["urn:app"]))
            .build();
        assert_eq!(ctx.max_array_length, 10);
        assert_eq!(ctx.max_nesting_levels, 3);
        assert_eq!(ctx.namespaces.index_of("urn:app"), Some(1));
    }

    #[test]
    fn test_registry_lookup_miss() {
        let registry = TypeRegistry::new();
        let unknown = ExpandedNodeId::new(NodeId::numeric(1, 77));
        assert!(registry.lookup_json(&unknown).is_none());
        assert!(registry.lookup_binary(&unknown).is_none());
    }
}
