// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Binary Codec Integration Tests
//!
//! Integration tests for the binary mapping:
//!
//! - Round trips across the built-in types
//! - Node id layout selection
//! - Data value and diagnostic info masks
//! - Extension object registry decoding
//! - Limit enforcement
//!
//! ## Test Categories
//!
//! - `test_binary_round_trip_*`: encode/decode equality
//! - `test_binary_layout_*`: exact wire byte expectations
//! - `test_binary_registry_*`: extension object decoding
//! - `test_binary_limit_*`: limit enforcement

use uawire_core::{
    binary::{BinaryDecoder, BinaryEncoder},
    context::MessageContext,
    status::StatusCode,
    types::{ExtensionObject, UaDateTime},
    variant::Variant,
};

use uawire_tests::common::builders::{DataValueBuilder, DiagnosticInfoBuilder};
use uawire_tests::common::fixtures::{
    ContextFixtures, MachineStatus, NodeIdFixtures, VariantFixtures,
};
use uawire_tests::common::init_test_logging;

fn round_trip(ctx: &MessageContext, value: &Variant) -> Variant {
    let bytes = BinaryEncoder::encode_variant(ctx, value).unwrap();
    BinaryDecoder::decode_variant(ctx, &bytes).unwrap()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_binary_round_trip_scalars() {
    init_test_logging();
    let ctx = ContextFixtures::default_context();
    for value in VariantFixtures::primitive_scalars() {
        assert_eq!(round_trip(&ctx, &value), value, "{value:?}");
    }
}

#[test]
fn test_binary_round_trip_node_ids() {
    let ctx = ContextFixtures::default_context();
    let values = vec![
        Variant::from(NodeIdFixtures::server_object()),
        Variant::from(NodeIdFixtures::motor_speed()),
        Variant::from(NodeIdFixtures::conveyor_state()),
        Variant::from(NodeIdFixtures::session_id()),
        Variant::from(NodeIdFixtures::opaque_handle()),
        Variant::from(NodeIdFixtures::absolute_motor()),
        Variant::from(VariantFixtures::browse_name()),
    ];
    for value in values {
        assert_eq!(round_trip(&ctx, &value), value, "{value:?}");
    }
}

#[test]
fn test_binary_round_trip_array_and_matrix() {
    let ctx = ContextFixtures::default_context();
    for value in [
        VariantFixtures::int32_array(),
        VariantFixtures::double_matrix_2x3(),
    ] {
        assert_eq!(round_trip(&ctx, &value), value);
    }
}

#[test]
fn test_binary_round_trip_data_value() {
    let ctx = ContextFixtures::default_context();
    let value = DataValueBuilder::new()
        .value(21.5f64)
        .status(StatusCode::UNCERTAIN)
        .source_timestamp(UaDateTime::from_ticks(133_500_000_000_000_000))
        .source_picoseconds(125)
        .build();
    let bytes = BinaryEncoder::encode_data_value(&ctx, &value).unwrap();
    assert_eq!(
        BinaryDecoder::decode_data_value(&ctx, &bytes).unwrap(),
        value
    );
}

#[test]
fn test_binary_round_trip_diagnostic_info_chain() {
    let ctx = ContextFixtures::default_context();
    let info = DiagnosticInfoBuilder::new()
        .symbolic_id(3)
        .namespace_uri(1)
        .additional_info("sensor drift detected")
        .inner_status_code(StatusCode::BAD_TIMEOUT)
        .inner(DiagnosticInfoBuilder::new().symbolic_id(8).build())
        .build();
    let value = Variant::from(info);
    assert_eq!(round_trip(&ctx, &value), value);
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_binary_layout_uint32_scalar() {
    let ctx = ContextFixtures::default_context();
    let bytes = BinaryEncoder::encode_variant(&ctx, &Variant::from(42u32)).unwrap();
    assert_eq!(bytes, vec![7, 42, 0, 0, 0]);
}

#[test]
fn test_binary_layout_node_id_picks_smallest_form() {
    let ctx = ContextFixtures::default_context();

    // Namespace 0, id <= 255: two-byte form.
    let bytes =
        BinaryEncoder::encode_variant(&ctx, &Variant::from(NodeIdFixtures::server_object()))
            .unwrap();
    assert_eq!(bytes[1], 0x01); // four-byte form: 2253 > 255
    let small = Variant::from(uawire_core::types::NodeId::numeric(0, 85));
    let bytes = BinaryEncoder::encode_variant(&ctx, &small).unwrap();
    assert_eq!(&bytes[1..], &[0x00, 85]);

    // Namespace 2, id 1001: four-byte form.
    let bytes = BinaryEncoder::encode_variant(&ctx, &Variant::from(NodeIdFixtures::motor_speed()))
        .unwrap();
    assert_eq!(&bytes[1..], &[0x01, 2, 0xE9, 0x03]);
}

#[test]
fn test_binary_layout_matches_json_reversible_semantics() {
    // The two codecs agree on what they carry, not on its shape.
    let ctx = ContextFixtures::default_context();
    for value in VariantFixtures::primitive_scalars() {
        let binary = round_trip(&ctx, &value);
        let text = uawire_core::json::JsonEncoder::encode_variant(
            &ctx,
            uawire_core::json::JsonEncoding::Reversible,
            &value,
        )
        .unwrap();
        let json = uawire_core::json::JsonDecoder::decode_variant(&ctx, &text).unwrap();
        assert_eq!(binary, json, "{value:?}");
    }
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_binary_registry_decodes_known_type() {
    init_test_logging();
    let ctx = ContextFixtures::registry_context();
    let status = MachineStatus {
        temperature: 88.25,
        cycle_count: 451,
        faulted: false,
    };
    let value = Variant::from(ExtensionObject::from_encodeable(Box::new(status.clone())));

    let bytes = BinaryEncoder::encode_variant(&ctx, &value).unwrap();
    let decoded = BinaryDecoder::decode_variant(&ctx, &bytes).unwrap();

    let object = match decoded {
        Variant::ExtensionObject(object) => object,
        other => panic!("expected extension object, got {other:?}"),
    };
    assert_eq!(object.decoded_as::<MachineStatus>(), Some(&status));
}

#[test]
fn test_binary_registry_unknown_type_round_trips_raw() {
    let ctx = ContextFixtures::default_context();
    let object = ExtensionObject::binary(
        uawire_core::types::ExpandedNodeId::new(uawire_core::types::NodeId::numeric(5, 777)),
        vec![1u8, 2, 3, 4, 5],
    );
    let value = Variant::from(object);
    assert_eq!(round_trip(&ctx, &value), value);
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_binary_limit_array_length_on_decode() {
    let ctx = MessageContext::builder().max_array_length(2).build();
    let open = ContextFixtures::default_context();
    let bytes = BinaryEncoder::encode_variant(&open, &Variant::from(vec![1i32, 2, 3])).unwrap();
    let err = BinaryDecoder::decode_variant(&ctx, &bytes).unwrap_err();
    assert!(err.is_limit_violation());
}

#[test]
fn test_binary_limit_message_size_on_decode() {
    let ctx = MessageContext::builder().max_message_size(4).build();
    let open = ContextFixtures::default_context();
    let bytes = BinaryEncoder::encode_variant(&open, &Variant::from("too big")).unwrap();
    let err = BinaryDecoder::decode_variant(&ctx, &bytes).unwrap_err();
    assert!(err.is_limit_violation());
}

#[test]
fn test_binary_limit_nesting_depth() {
    let ctx = MessageContext::builder().max_nesting_levels(2).build();
    let deep = Variant::Variant(Box::new(Variant::Variant(Box::new(Variant::from(1i32)))));
    let err = BinaryEncoder::encode_variant(&ctx, &deep).unwrap_err();
    assert!(err.is_limit_violation());
}

#[test]
fn test_binary_truncated_stream_is_an_error() {
    let ctx = ContextFixtures::default_context();
    let bytes =
        BinaryEncoder::encode_variant(&ctx, &Variant::from(NodeIdFixtures::conveyor_state()))
            .unwrap();
    for cut in 1..bytes.len() {
        assert!(
            BinaryDecoder::decode_variant(&ctx, &bytes[..cut]).is_err(),
            "cut at {cut}"
        );
    }
}
