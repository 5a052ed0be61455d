// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Built-in data types of the OPC UA value model.
//!
//! Everything a [`Variant`](crate::variant::Variant) can carry lives here:
//! the built-in type table itself, node identifiers, timestamps, qualified
//! and localized names, extension objects and the diagnostic/data-value
//! composites.

pub mod builtin;
pub mod byte_string;
pub mod data_value;
pub mod date_time;
pub mod diagnostic_info;
pub mod expanded_node_id;
pub mod extension_object;
pub mod localized_text;
pub mod node_id;
pub mod qualified_name;

pub use builtin::{BuiltInType, TypeInfo, ValueRank};
pub use byte_string::ByteString;
pub use data_value::DataValue;
pub use date_time::UaDateTime;
pub use diagnostic_info::DiagnosticInfo;
pub use expanded_node_id::ExpandedNodeId;
pub use extension_object::{Encodeable, ExtensionObject, ExtensionObjectBody};
pub use localized_text::LocalizedText;
pub use node_id::{IdType, Identifier, NodeId};
pub use qualified_name::QualifiedName;
