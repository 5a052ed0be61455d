// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uawire Integration Tests
//!
//! This crate provides integration tests for the uawire OPC UA codec
//! stack, along with shared test utilities and fixtures.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities, fixtures, and helpers
//!   - `fixtures`: Pre-built values, node ids, and message contexts
//!   - `builders`: Builder patterns for constructing test objects
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p uawire-tests
//!
//! # Run specific test suite
//! cargo test -p uawire-tests --test integration_json
//! cargo test -p uawire-tests --test integration_binary
//! cargo test -p uawire-tests --test integration_text
//!
//! # Run with verbose output
//! cargo test -p uawire-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! ### JSON Tests (`integration_json.rs`)
//! - Reversible round trips across the built-in types
//! - Non-reversible, compact and verbose layouts
//! - Namespace remapping and table updates
//! - Nesting and size limit enforcement
//! - Extension object registry decoding
//!
//! ### Binary Tests (`integration_binary.rs`)
//! - Round trips across the built-in types
//! - Node id layout selection
//! - Data value and diagnostic info masks
//! - Cross-codec equivalence (binary vs reversible JSON)
//!
//! ### Text Tests (`integration_text.rs`)
//! - Node id and expanded node id text grammar
//! - Qualified name parsing
//! - Escaping of reserved characters in namespace URIs

pub mod common;
