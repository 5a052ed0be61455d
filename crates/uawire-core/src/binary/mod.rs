// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary wire codec.
//!
//! Implements the OPC UA Part 6 binary mapping: little-endian scalars,
//! `Int32`-length-prefixed strings (`-1` for null), compressed node id
//! layouts selected by an encoding byte, and bitmask-prefixed optional
//! fields for data values, localized text and diagnostic info.
//!
//! Both directions run under the limits of a
//! [`MessageContext`](crate::context::MessageContext), with the same nesting
//! discipline as the JSON codec.

pub mod decoder;
pub mod encoder;

pub use decoder::BinaryDecoder;
pub use encoder::BinaryEncoder;

/// Wire constants of the binary mapping.
pub(crate) mod wire {
    // Node id encoding byte: low nibble selects the layout.
    pub const NODE_ID_TWO_BYTE: u8 = 0x00;
    pub const NODE_ID_FOUR_BYTE: u8 = 0x01;
    pub const NODE_ID_NUMERIC: u8 = 0x02;
    pub const NODE_ID_STRING: u8 = 0x03;
    pub const NODE_ID_GUID: u8 = 0x04;
    pub const NODE_ID_BYTE_STRING: u8 = 0x05;

    // Expanded node id flags, OR-ed into the node id encoding byte.
    pub const NODE_ID_NAMESPACE_URI: u8 = 0x80;
    pub const NODE_ID_SERVER_INDEX: u8 = 0x40;

    // Variant encoding byte: low 6 bits carry the built-in type id.
    pub const VARIANT_ARRAY: u8 = 0x80;
    pub const VARIANT_DIMENSIONS: u8 = 0x40;
    pub const VARIANT_TYPE_MASK: u8 = 0x3F;

    // Extension object encoding byte.
    pub const BODY_NONE: u8 = 0x00;
    pub const BODY_BYTE_STRING: u8 = 0x01;
    pub const BODY_XML: u8 = 0x02;

    // Data value field mask.
    pub const DV_VALUE: u8 = 0x01;
    pub const DV_STATUS: u8 = 0x02;
    pub const DV_SOURCE_TIMESTAMP: u8 = 0x04;
    pub const DV_SERVER_TIMESTAMP: u8 = 0x08;
    pub const DV_SOURCE_PICOSECONDS: u8 = 0x10;
    pub const DV_SERVER_PICOSECONDS: u8 = 0x20;

    // Diagnostic info field mask.
    pub const DI_SYMBOLIC_ID: u8 = 0x01;
    pub const DI_NAMESPACE_URI: u8 = 0x02;
    pub const DI_LOCALIZED_TEXT: u8 = 0x04;
    pub const DI_LOCALE: u8 = 0x08;
    pub const DI_ADDITIONAL_INFO: u8 = 0x10;
    pub const DI_INNER_STATUS_CODE: u8 = 0x20;
    pub const DI_INNER_DIAGNOSTIC_INFO: u8 = 0x40;

    // Localized text field mask.
    pub const LT_LOCALE: u8 = 0x01;
    pub const LT_TEXT: u8 = 0x02;
}
