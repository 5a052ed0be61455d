// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing.
//!
//! ## Design Principles
//!
//! - Fixtures are immutable and thread-safe
//! - Each fixture represents a realistic scenario
//! - Fixtures can be composed for complex test scenarios

use std::any::Any;

use uuid::Uuid;

use uawire_core::{
    binary::{BinaryDecoder, BinaryEncoder},
    context::{MessageContext, TypeRegistry},
    error::EncodingResult,
    json::{JsonDecoder, JsonEncoder},
    tables::NamespaceTable,
    types::{
        BuiltInType, Encodeable, ExpandedNodeId, NodeId, QualifiedName,
    },
    variant::Variant,
};

// =============================================================================
// Node Id Fixtures
// =============================================================================

/// Fixture providing node ids across every identifier kind.
pub struct NodeIdFixtures;

impl NodeIdFixtures {
    /// A numeric node id in the standard namespace.
    pub fn server_object() -> NodeId {
        NodeId::numeric(0, 2253)
    }

    /// A numeric node id in an application namespace.
    pub fn motor_speed() -> NodeId {
        NodeId::numeric(2, 1001)
    }

    /// A string node id addressing a plant asset.
    pub fn conveyor_state() -> NodeId {
        NodeId::string(3, "Line1.Conveyor.State")
    }

    /// A guid node id.
    pub fn session_id() -> NodeId {
        NodeId::guid(
            1,
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        )
    }

    /// An opaque node id.
    pub fn opaque_handle() -> NodeId {
        NodeId::opaque(4, vec![0xDE, 0xAD, 0xBE, 0xEF])
    }

    /// An expanded node id that is absolute via a namespace URI.
    pub fn absolute_motor() -> ExpandedNodeId {
        ExpandedNodeId::with_namespace_uri(
            NodeId::string(0, "Motor42"),
            "urn:factory:line1",
        )
    }
}

// =============================================================================
// Variant Fixtures
// =============================================================================

/// Fixture providing variants covering scalar, array and matrix ranks.
pub struct VariantFixtures;

impl VariantFixtures {
    /// One scalar of every primitive built-in type.
    pub fn primitive_scalars() -> Vec<Variant> {
        vec![
            Variant::from(true),
            Variant::from(-8i8),
            Variant::from(250u8),
            Variant::from(-1234i16),
            Variant::from(40_000u16),
            Variant::from(-100_000i32),
            Variant::from(3_000_000_000u32),
            Variant::from(i64::MIN),
            Variant::from(u64::MAX),
            Variant::from(1.5f32),
            Variant::from(-2.25f64),
            Variant::from("hello plant"),
            Variant::from(vec![1u8, 2, 3, 4]),
        ]
    }

    /// A one-dimensional Int32 array.
    pub fn int32_array() -> Variant {
        Variant::from(vec![10i32, 20, 30, 40])
    }

    /// A 2x3 Double matrix with row-major elements 1..=6.
    pub fn double_matrix_2x3() -> Variant {
        Variant::matrix(
            BuiltInType::Double,
            (1..=6).map(|n| Variant::Double(f64::from(n))).collect(),
            vec![2, 3],
        )
        .unwrap()
    }

    /// A qualified name in an application namespace.
    pub fn browse_name() -> QualifiedName {
        QualifiedName::new(2, "MotorSpeed")
    }
}

// =============================================================================
// Context Fixtures
// =============================================================================

/// Fixture providing message contexts for common limit scenarios.
pub struct ContextFixtures;

impl ContextFixtures {
    /// A context with default limits and empty tables.
    pub fn default_context() -> MessageContext {
        MessageContext::new()
    }

    /// A context with tight limits for violation tests.
    pub fn strict_context() -> MessageContext {
        MessageContext::builder()
            .max_message_size(256)
            .max_string_length(16)
            .max_byte_string_length(16)
            .max_array_length(8)
            .max_nesting_levels(4)
            .build()
    }

    /// A context whose namespace table carries two application URIs after
    /// the standard namespace.
    pub fn factory_context() -> MessageContext {
        let namespaces = NamespaceTable::from_uris(["urn:factory:line1", "urn:factory:line2"]);
        MessageContext::builder().namespaces(namespaces).build()
    }

    /// A context whose registry decodes [`MachineStatus`] on both wires.
    pub fn registry_context() -> MessageContext {
        let mut registry = TypeRegistry::new();
        registry.register_json(MachineStatus::data_type_id(), MachineStatus::decode_json);
        registry.register_binary(MachineStatus::data_type_id(), MachineStatus::decode_binary);
        MessageContext::builder().type_registry(registry).build()
    }
}

// =============================================================================
// MachineStatus
// =============================================================================

/// A structured type used to exercise extension-object registry decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineStatus {
    /// Spindle temperature in degrees Celsius.
    pub temperature: f64,
    /// Completed machining cycles.
    pub cycle_count: u32,
    /// Whether the machine is currently faulted.
    pub faulted: bool,
}

impl MachineStatus {
    /// The data type id this struct is registered under.
    pub fn data_type_id() -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::numeric(2, 5001))
    }

    /// Registered JSON decode function.
    pub fn decode_json(decoder: &mut JsonDecoder<'_>) -> EncodingResult<Box<dyn Encodeable>> {
        Ok(Box::new(MachineStatus {
            temperature: decoder.read_double("Temperature")?,
            cycle_count: decoder.read_uint32("CycleCount")?,
            faulted: decoder.read_boolean("Faulted")?,
        }))
    }

    /// Registered binary decode function.
    pub fn decode_binary(decoder: &mut BinaryDecoder<'_>) -> EncodingResult<Box<dyn Encodeable>> {
        Ok(Box::new(MachineStatus {
            temperature: decoder.read_double()?,
            cycle_count: decoder.read_uint32()?,
            faulted: decoder.read_boolean()?,
        }))
    }
}

impl Encodeable for MachineStatus {
    fn type_id(&self) -> ExpandedNodeId {
        MachineStatus::data_type_id()
    }

    fn encode_json(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
        encoder.write_double("Temperature", self.temperature)?;
        encoder.write_uint32("CycleCount", self.cycle_count)?;
        encoder.write_boolean("Faulted", self.faulted)
    }

    fn encode_binary(&self, encoder: &mut BinaryEncoder<'_>) -> EncodingResult<()> {
        encoder.write_double(self.temperature)?;
        encoder.write_uint32(self.cycle_count)?;
        encoder.write_boolean(self.faulted)
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
            .downcast_ref::<MachineStatus>()
            .is_some_and(|o| o == self)
    }
}
