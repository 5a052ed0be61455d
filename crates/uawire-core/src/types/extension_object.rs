// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Containers for opaquely-typed structured bodies.
//!
//! An [`ExtensionObject`] carries a structured value identified by a type
//! id. The body is held in whichever form the wire delivered it: raw binary
//! bytes, an XML element, a raw JSON tree, or — when the type id resolves
//! through the message context's type registry — a fully decoded
//! [`Encodeable`] value.
//!
//! Unknown type ids are **not** errors: the raw body is preserved unmodified
//! so a message can be re-encoded without understanding every type it
//! carries.

use std::any::Any;
use std::fmt;

use crate::binary::BinaryEncoder;
use crate::error::EncodingResult;
use crate::json::JsonEncoder;
use crate::types::byte_string::ByteString;
use crate::types::expanded_node_id::ExpandedNodeId;

// =============================================================================
// Encodeable
// =============================================================================

/// A structured value that knows how to encode itself on both wires.
///
/// Decoding is registered separately, through the message context's
/// [`TypeRegistry`](crate::context::TypeRegistry), so that a decoder can
/// resolve a wire type id to a decode function without a value in hand.
pub trait Encodeable: fmt::Debug + Send + Sync {
    /// The data type id of this value.
    fn type_id(&self) -> ExpandedNodeId;

    /// Writes the fields of this value into the encoder's current structure.
    fn encode_json(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()>;

    /// Writes the fields of this value to the binary stream.
    fn encode_binary(&self, encoder: &mut BinaryEncoder<'_>) -> EncodingResult<()>;

    /// Deep-copies this value.
    fn clone_encodeable(&self) -> Box<dyn Encodeable>;

    /// Upcast for downcasting in equality checks and application code.
    fn as_any(&self) -> &dyn Any;

    /// Value equality against another encodeable of possibly different
    /// concrete type.
    fn eq_encodeable(&self, other: &dyn Encodeable) -> bool;
}

impl Clone for Box<dyn Encodeable> {
    fn clone(&self) -> Self {
        self.clone_encodeable()
    }
}

impl PartialEq for Box<dyn Encodeable> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_encodeable(other.as_ref())
    }
}

// =============================================================================
// ExtensionObjectBody
// =============================================================================

/// The body of an [`ExtensionObject`], in whichever form the wire carried it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExtensionObjectBody {
    /// No body.
    #[default]
    None,
    /// Opaque binary-encoded body.
    Binary(ByteString),
    /// XML-encoded body carried as text.
    Xml(String),
    /// Raw JSON body preserved for round-tripping unknown types.
    Json(serde_json::Value),
    /// A decoded structured value.
    Decoded(Box<dyn Encodeable>),
}

impl ExtensionObjectBody {
    /// Returns `true` if there is no body.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// =============================================================================
// ExtensionObject
// =============================================================================

/// A structured body tagged with its data type id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionObject {
    /// Identifies the data type of the body.
    pub type_id: ExpandedNodeId,
    /// The body.
    pub body: ExtensionObjectBody,
}

impl ExtensionObject {
    /// Creates an empty extension object.
    #[inline]
    pub fn null() -> Self {
        ExtensionObject::default()
    }

    /// Wraps a decoded value, taking the type id from the value itself.
    pub fn from_encodeable(value: Box<dyn Encodeable>) -> Self {
        ExtensionObject {
            type_id: Encodeable::type_id(value.as_ref()),
            body: ExtensionObjectBody::Decoded(value),
        }
    }

    /// Creates an extension object with a binary body.
    pub fn binary(type_id: ExpandedNodeId, body: impl Into<ByteString>) -> Self {
        ExtensionObject {
            type_id,
            body: ExtensionObjectBody::Binary(body.into()),
        }
    }

    /// Creates an extension object with an XML body.
    pub fn xml(type_id: ExpandedNodeId, body: impl Into<String>) -> Self {
        ExtensionObject {
            type_id,
            body: ExtensionObjectBody::Xml(body.into()),
        }
    }

    /// Creates an extension object preserving a raw JSON body.
    pub fn json(type_id: ExpandedNodeId, body: serde_json::Value) -> Self {
        ExtensionObject {
            type_id,
            body: ExtensionObjectBody::Json(body),
        }
    }

    /// Returns `true` if this object has a null type id and no body.
    pub fn is_null(&self) -> bool {
        self.type_id.is_null() && self.body.is_none()
    }

    /// Returns the decoded body, downcast to `T`, when this object holds a
    /// decoded value of that type.
    pub fn decoded_as<T: 'static>(&self) -> Option<&T> {
        match &self.body {
            ExtensionObjectBody::Decoded(value) => value.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node_id::NodeId;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        value: i32,
    }

    impl Encodeable for Probe {
        fn type_id(&self) -> ExpandedNodeId {
            ExpandedNodeId::new(NodeId::numeric(1, 4000))
        }

        fn encode_json(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
            encoder.write_int32("Value", self.value)
        }

        fn encode_binary(&self, encoder: &mut BinaryEncoder<'_>) -> EncodingResult<()> {
            encoder.write_int32(self.value)
        }

        fn clone_encodeable(&self) -> Box<dyn Encodeable> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn eq_encodeable(&self, other: &dyn Encodeable) -> bool {
            other
                .as_any()
                .downcast_ref::<Probe>()
                .is_some_and(|o| o == self)
        }
    }

    #[test]
    fn test_extension_object_decoded_body() {
        let object = ExtensionObject::from_encodeable(Box::new(Probe { value: 7 }));
        assert_eq!(object.type_id.node_id, NodeId::numeric(1, 4000));
        assert_eq!(object.decoded_as::<Probe>(), Some(&Probe { value: 7 }));

        let clone = object.clone();
        assert_eq!(clone, object);
    }

    #[test]
    fn test_extension_object_null() {
        assert!(ExtensionObject::null().is_null());
        let with_body = ExtensionObject::binary(ExpandedNodeId::NULL, vec![1u8]);
        assert!(!with_body.is_null());
    }

    #[test]
    fn test_extension_object_json_passthrough_eq() {
        let type_id = ExpandedNodeId::new(NodeId::numeric(2, 99));
        let body = serde_json::json!({"A": 1, "B": [true, false]});
        let object = ExtensionObject::json(type_id.clone(), body.clone());
        assert_eq!(object, ExtensionObject::json(type_id, body));
    }
}
