// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Text Grammar Integration Tests
//!
//! Integration tests for the textual identifier grammars:
//!
//! - Node id parse/format round trips
//! - Expanded node id prefixes (`svr=`, `nsu=`)
//! - Qualified name parsing
//! - URI escaping of reserved characters
//!
//! ## Test Categories
//!
//! - `test_text_node_id_*`: node id grammar
//! - `test_text_expanded_*`: expanded node id grammar
//! - `test_text_qualified_name_*`: qualified name grammar

use uawire_core::{
    tables::StringTable,
    types::{ExpandedNodeId, Identifier, NodeId, QualifiedName},
};

use uawire_tests::common::fixtures::NodeIdFixtures;

// =============================================================================
// Node Id Grammar Tests
// =============================================================================

#[test]
fn test_text_node_id_round_trips_every_identifier_kind() {
    let ids = vec![
        NodeIdFixtures::server_object(),
        NodeIdFixtures::motor_speed(),
        NodeIdFixtures::conveyor_state(),
        NodeIdFixtures::session_id(),
        NodeIdFixtures::opaque_handle(),
    ];
    for id in ids {
        let text = id.to_string();
        assert_eq!(NodeId::parse(&text).unwrap(), id, "{text}");
    }
}

#[test]
fn test_text_node_id_namespace_zero_has_no_prefix() {
    assert_eq!(NodeId::numeric(0, 85).to_string(), "i=85");
    assert_eq!(NodeId::parse("i=85").unwrap(), NodeId::numeric(0, 85));
}

#[test]
fn test_text_node_id_string_keeps_separators_after_first_token() {
    // Only the first `x=` token is structural.
    let id = NodeId::parse("ns=1;s=Tank;level=2").unwrap();
    assert_eq!(id.identifier, Identifier::String("Tank;level=2".to_string()));
}

#[test]
fn test_text_node_id_rejects_malformed_input() {
    for text in ["", "ns=2", "i=abc", "x=1", "ns=70000;i=1", "g=not-a-guid"] {
        assert!(NodeId::parse(text).is_err(), "{text:?} should fail");
    }
}

// =============================================================================
// Expanded Node Id Grammar Tests
// =============================================================================

#[test]
fn test_text_expanded_round_trips() {
    let ids = vec![
        ExpandedNodeId::new(NodeId::numeric(2, 7)),
        NodeIdFixtures::absolute_motor(),
        ExpandedNodeId::new(NodeId::string(1, "Pump")).with_server_index(4),
    ];
    for id in ids {
        let text = id.to_string();
        assert_eq!(ExpandedNodeId::parse(&text).unwrap(), id, "{text}");
    }
}

#[test]
fn test_text_expanded_uri_reserved_characters_are_escaped() {
    let id = ExpandedNodeId::with_namespace_uri(NodeId::numeric(0, 1), "urn:a;b%c");
    let text = id.to_string();
    assert!(text.contains("nsu=urn:a%3Bb%25c;"), "{text}");
    assert_eq!(ExpandedNodeId::parse(&text).unwrap(), id);
}

#[test]
fn test_text_expanded_server_index_resolves_against_table() {
    let servers = StringTable::from_strings(["urn:server:alpha", "urn:server:beta"]);
    let id = ExpandedNodeId::parse_with_tables("svu=urn:server:beta;ns=2;i=9", &servers).unwrap();
    assert_eq!(id.server_index, 1);
    assert_eq!(id.node_id, NodeId::numeric(2, 9));
}

// =============================================================================
// Qualified Name Grammar Tests
// =============================================================================

#[test]
fn test_text_qualified_name_with_namespace_prefix() {
    let name = QualifiedName::parse("2:MotorSpeed").unwrap();
    assert_eq!(name, QualifiedName::new(2, "MotorSpeed"));
}

#[test]
fn test_text_qualified_name_without_prefix_lands_in_namespace_zero() {
    let name = QualifiedName::parse("MotorSpeed").unwrap();
    assert_eq!(name, QualifiedName::new(0, "MotorSpeed"));

    // A non-numeric prefix is part of the name, not a namespace.
    let name = QualifiedName::parse("abc:Speed").unwrap();
    assert_eq!(name, QualifiedName::new(0, "abc:Speed"));
}
