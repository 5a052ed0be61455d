// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JSON wire codec.
//!
//! Implements the OPC UA Part 6 JSON mapping in its four policy variants:
//!
//! - **Reversible** — binary-equivalent: type tags, namespace indexes,
//!   defaults omitted. `decode(encode(v)) == v`.
//! - **NonReversible** — for consumers outside the stack: bare values,
//!   namespace URIs instead of indexes, symbolic status codes.
//! - **Compact** — reversible layout with `Ua*`-prefixed artifact fields
//!   and node ids in compact string form. Fixed policy.
//! - **Verbose** — non-reversible layout with default values included.
//!   Fixed policy.
//!
//! Both directions run under the limits of a
//! [`MessageContext`](crate::context::MessageContext); all recursive entry
//! points maintain a nesting counter with guaranteed decrement on exit.

pub mod decoder;
pub mod encoder;

pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;

// =============================================================================
// JsonEncoding
// =============================================================================

/// The JSON encoding policy variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JsonEncoding {
    /// Binary-equivalent encoding; round-trips exactly.
    #[default]
    Reversible,
    /// Consumer-facing encoding: bare values, URIs, symbols.
    NonReversible,
    /// Reversible layout with `Ua*` artifact field names. Fixed policy.
    Compact,
    /// Non-reversible layout with defaults included. Fixed policy.
    Verbose,
}

impl JsonEncoding {
    /// Returns `true` for the encodings whose output decodes back to the
    /// identical value (Reversible and Compact).
    #[inline]
    pub fn is_reversible(self) -> bool {
        matches!(self, Self::Reversible | Self::Compact)
    }

    /// Returns `true` for the encodings with fixed, non-mutable policy.
    #[inline]
    pub fn has_fixed_policy(self) -> bool {
        matches!(self, Self::Compact | Self::Verbose)
    }
}

// =============================================================================
// Wire field names
// =============================================================================

/// JSON field names defined by the Part 6 mapping.
pub(crate) mod field {
    pub const TYPE: &str = "Type";
    pub const BODY: &str = "Body";
    pub const DIMENSIONS: &str = "Dimensions";
    pub const ARRAY: &str = "Array";

    pub const ID: &str = "Id";
    pub const ID_TYPE: &str = "IdType";
    pub const NAMESPACE: &str = "Namespace";
    pub const SERVER_URI: &str = "ServerUri";

    pub const NAME: &str = "Name";
    pub const URI: &str = "Uri";

    pub const LOCALE: &str = "Locale";
    pub const TEXT: &str = "Text";

    pub const CODE: &str = "Code";
    pub const SYMBOL: &str = "Symbol";

    pub const TYPE_ID: &str = "TypeId";
    pub const ENCODING: &str = "Encoding";
    pub const UA_TYPE_ID: &str = "UaTypeId";
    pub const UA_ENCODING: &str = "UaEncoding";
    pub const UA_BODY: &str = "UaBody";

    pub const VALUE: &str = "Value";
    pub const STATUS: &str = "Status";
    pub const SOURCE_TIMESTAMP: &str = "SourceTimestamp";
    pub const SOURCE_PICOSECONDS: &str = "SourcePicoseconds";
    pub const SERVER_TIMESTAMP: &str = "ServerTimestamp";
    pub const SERVER_PICOSECONDS: &str = "ServerPicoseconds";

    pub const SYMBOLIC_ID: &str = "SymbolicId";
    pub const NAMESPACE_URI: &str = "NamespaceUri";
    pub const LOCALIZED_TEXT: &str = "LocalizedText";
    pub const ADDITIONAL_INFO: &str = "AdditionalInfo";
    pub const INNER_STATUS_CODE: &str = "InnerStatusCode";
    pub const INNER_DIAGNOSTIC_INFO: &str = "InnerDiagnosticInfo";
}

/// Largest integer magnitude JSON numbers carry without precision loss;
/// 64-bit values beyond it are string-encoded on the wire.
pub(crate) const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_classification() {
        assert!(JsonEncoding::Reversible.is_reversible());
        assert!(JsonEncoding::Compact.is_reversible());
        assert!(!JsonEncoding::NonReversible.is_reversible());
        assert!(!JsonEncoding::Verbose.is_reversible());

        assert!(JsonEncoding::Compact.has_fixed_policy());
        assert!(JsonEncoding::Verbose.has_fixed_policy());
        assert!(!JsonEncoding::Reversible.has_fixed_policy());
    }
}
