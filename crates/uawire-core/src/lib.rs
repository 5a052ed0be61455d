// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uawire-core
//!
//! OPC UA value model and wire codecs in pure Rust.
//!
//! This crate provides the data types exchanged by OPC UA applications and
//! the codecs that put them on the wire:
//!
//! - **Types**: `Variant`, `NodeId`, `ExpandedNodeId`, `QualifiedName`,
//!   `LocalizedText`, `DataValue`, `ExtensionObject`, `DiagnosticInfo`
//! - **Matrix**: multi-dimensional arrays with validated dimensions
//! - **Json**: the Part 6 JSON mapping in reversible, non-reversible,
//!   compact and verbose forms
//! - **Binary**: the Part 6 binary mapping
//! - **Context**: per-message limits, namespace tables and the extension
//!   object type registry
//!
//! ## Example
//!
//! ```rust
//! use uawire_core::context::MessageContext;
//! use uawire_core::json::{JsonDecoder, JsonEncoder, JsonEncoding};
//! use uawire_core::variant::Variant;
//!
//! let ctx = MessageContext::new();
//! let value = Variant::from(42u32);
//!
//! let text = JsonEncoder::encode_variant(&ctx, JsonEncoding::Reversible, &value).unwrap();
//! assert_eq!(text, r#"{"Type":7,"Body":42}"#);
//!
//! let decoded = JsonDecoder::decode_variant(&ctx, &text).unwrap();
//! assert_eq!(decoded, value);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod status;
pub mod types;

// =============================================================================
// Value Model Modules
// =============================================================================

pub mod matrix;
pub mod tables;
pub mod variant;

// =============================================================================
// Codec Modules
// =============================================================================

pub mod binary;
pub mod context;
pub mod json;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{EncodingError, EncodingResult};
pub use status::StatusCode;

pub use types::{
    BuiltInType, ByteString, DataValue, DiagnosticInfo, Encodeable, ExpandedNodeId,
    ExtensionObject, ExtensionObjectBody, IdType, Identifier, LocalizedText, NodeId,
    QualifiedName, TypeInfo, UaDateTime, ValueRank,
};

pub use matrix::{Matrix, VariantArray};
pub use tables::{NamespaceTable, StringTable, STANDARD_NAMESPACE_URI};
pub use variant::Variant;

pub use context::{MessageContext, MessageContextBuilder, TypeRegistry};

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use json::{JsonDecoder, JsonEncoder, JsonEncoding};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
