// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA node identifiers.
//!
//! A [`NodeId`] uniquely identifies a node within a server's address space.
//! It pairs a namespace index with one of four identifier kinds:
//!
//! - **Numeric** — `ns=2;i=1001`
//! - **String** — `ns=2;s=Machine.Temperature`
//! - **Guid** — `ns=2;g=550e8400-e29b-41d4-a716-446655440000`
//! - **Opaque** — `ns=2;b=AQIDBA==` (base64 bytes)
//!
//! The compact text grammar round-trips exactly: `parse(format(n)) == n` for
//! every identifier kind, with and without the namespace prefix. A string
//! identifier occupies the remainder of the text, so it may itself contain
//! `;` or `=` without escaping.
//!
//! # Examples
//!
//! ```
//! use uawire_core::types::NodeId;
//!
//! let node: NodeId = "ns=2;s=Line1.Motor.Speed".parse().unwrap();
//! assert_eq!(node.namespace, 2);
//! assert_eq!(node.to_string(), "ns=2;s=Line1.Motor.Speed");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EncodingError, EncodingResult};
use crate::types::byte_string::ByteString;

// =============================================================================
// IdType
// =============================================================================

/// The identifier kind of a node id.
///
/// The discriminants are the wire values of the JSON `IdType` field and the
/// low bits of the binary node id encoding byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IdType {
    /// Unsigned 32-bit numeric identifier.
    Numeric = 0,
    /// String identifier.
    String = 1,
    /// Guid identifier.
    Guid = 2,
    /// Opaque (byte string) identifier.
    Opaque = 3,
}

impl IdType {
    /// Resolves a wire value to an identifier kind.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Numeric),
            1 => Some(Self::String),
            2 => Some(Self::Guid),
            3 => Some(Self::Opaque),
            _ => None,
        }
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// The identifier portion of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identifier {
    /// Unsigned 32-bit numeric identifier.
    Numeric(u32),
    /// String identifier.
    String(String),
    /// Guid identifier.
    Guid(Uuid),
    /// Opaque (byte string) identifier.
    Opaque(ByteString),
}

impl Identifier {
    /// Returns the identifier kind.
    #[inline]
    pub fn id_type(&self) -> IdType {
        match self {
            Self::Numeric(_) => IdType::Numeric,
            Self::String(_) => IdType::String,
            Self::Guid(_) => IdType::Guid,
            Self::Opaque(_) => IdType::Opaque,
        }
    }

    /// Returns `true` if this is the zero value of its kind.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Numeric(v) => *v == 0,
            Self::String(s) => s.is_empty(),
            Self::Guid(g) => g.is_nil(),
            Self::Opaque(b) => b.is_empty(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={v}"),
            Self::String(s) => write!(f, "s={s}"),
            Self::Guid(g) => write!(f, "g={g}"),
            Self::Opaque(b) => write!(f, "b={}", b.to_base64()),
        }
    }
}

// =============================================================================
// NodeId
// =============================================================================

/// An OPC UA node identifier: namespace index plus identifier.
///
/// Immutable after construction. The null node id is `ns=0;i=0`; every
/// identifier kind's zero value in namespace 0 also counts as null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = the OPC UA standard namespace).
    pub namespace: u16,
    /// The identifier.
    pub identifier: Identifier,
}

impl NodeId {
    /// The null node id (`ns=0;i=0`).
    pub const NULL: NodeId = NodeId {
        namespace: 0,
        identifier: Identifier::Numeric(0),
    };

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a numeric node id.
    #[inline]
    pub const fn numeric(namespace: u16, value: u32) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Creates a string node id.
    #[inline]
    pub fn string(namespace: u16, value: impl Into<String>) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    /// Creates a guid node id.
    #[inline]
    pub const fn guid(namespace: u16, value: Uuid) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::Guid(value),
        }
    }

    /// Creates an opaque node id.
    #[inline]
    pub fn opaque(namespace: u16, value: impl Into<ByteString>) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::Opaque(value.into()),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the identifier kind.
    #[inline]
    pub fn id_type(&self) -> IdType {
        self.identifier.id_type()
    }

    /// Returns `true` if this is a null node id.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.identifier.is_default()
    }

    /// Returns a copy with the namespace index replaced.
    #[inline]
    pub fn with_namespace(&self, namespace: u16) -> Self {
        NodeId {
            namespace,
            identifier: self.identifier.clone(),
        }
    }

    // =========================================================================
    // Text grammar
    // =========================================================================

    /// Parses the compact text form.
    ///
    /// Equivalent to [`FromStr`]; malformed text fails with
    /// `BadNodeIdInvalid`.
    pub fn parse(text: &str) -> EncodingResult<Self> {
        let (namespace, rest) = parse_namespace_prefix(text)?;
        let identifier = parse_identifier(rest, text)?;
        Ok(NodeId {
            namespace,
            identifier,
        })
    }
}

impl Default for NodeId {
    #[inline]
    fn default() -> Self {
        Self::NULL
    }
}

impl FromStr for NodeId {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeId::parse(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        write!(f, "{}", self.identifier)
    }
}

// =============================================================================
// Grammar helpers (shared with ExpandedNodeId)
// =============================================================================

/// Consumes an optional `ns=<n>;` prefix.
pub(crate) fn parse_namespace_prefix(text: &str) -> EncodingResult<(u16, &str)> {
    match text.strip_prefix("ns=") {
        Some(rest) => {
            let end = rest.find(';').ok_or_else(|| {
                EncodingError::node_id_invalid(format!("missing ';' after namespace in '{text}'"))
            })?;
            let namespace = rest[..end].parse::<u16>().map_err(|_| {
                EncodingError::node_id_invalid(format!("invalid namespace index in '{text}'"))
            })?;
            Ok((namespace, &rest[end + 1..]))
        }
        None => Ok((0, text)),
    }
}

/// Parses the `<idtype-prefix><id>` tail. The full original text is carried
/// for error messages only.
pub(crate) fn parse_identifier(rest: &str, original: &str) -> EncodingResult<Identifier> {
    if rest.len() < 2 || rest.as_bytes()[1] != b'=' {
        return Err(EncodingError::node_id_invalid(format!(
            "missing identifier prefix in '{original}'"
        )));
    }
    let body = &rest[2..];
    match rest.as_bytes()[0] {
        b'i' => body
            .parse::<u32>()
            .map(Identifier::Numeric)
            .map_err(|_| EncodingError::node_id_invalid(format!("invalid numeric id in '{original}'"))),
        b's' => Ok(Identifier::String(body.to_string())),
        b'g' => Uuid::parse_str(body)
            .map(Identifier::Guid)
            .map_err(|_| EncodingError::node_id_invalid(format!("invalid guid id in '{original}'"))),
        b'b' => ByteString::from_base64(body)
            .map(Identifier::Opaque)
            .map_err(|_| EncodingError::node_id_invalid(format!("invalid opaque id in '{original}'"))),
        _ => Err(EncodingError::node_id_invalid(format!(
            "unknown identifier prefix in '{original}'"
        ))),
    }
}

/// Escapes `%` and `;` in a URI for embedding in the compact text grammar.
pub(crate) fn escape_uri(uri: &str) -> String {
    let mut escaped = String::with_capacity(uri.len());
    for ch in uri.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            ';' => escaped.push_str("%3B"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverses [`escape_uri`]. Truncated or non-hex escapes fail with
/// `BadNodeIdInvalid`.
pub(crate) fn unescape_uri(escaped: &str) -> EncodingResult<String> {
    let mut uri = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            uri.push(ch);
            continue;
        }
        let hi = chars.next();
        let lo = chars.next();
        let escaped_byte = match (hi, lo) {
            (Some(hi), Some(lo)) => {
                let mut hex = String::with_capacity(2);
                hex.push(hi);
                hex.push(lo);
                u8::from_str_radix(&hex, 16).ok()
            }
            _ => {
                return Err(EncodingError::node_id_invalid(format!(
                    "truncated escape in uri '{escaped}'"
                )))
            }
        };
        match escaped_byte {
            Some(byte) if byte.is_ascii() => uri.push(byte as char),
            _ => {
                return Err(EncodingError::node_id_invalid(format!(
                    "invalid escape in uri '{escaped}'"
                )))
            }
        }
    }
    Ok(uri)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_numeric_round_trip() {
        let node = NodeId::numeric(2, 1001);
        assert_eq!(node.to_string(), "ns=2;i=1001");
        assert_eq!(NodeId::parse("ns=2;i=1001").unwrap(), node);

        let standard = NodeId::numeric(0, 85);
        assert_eq!(standard.to_string(), "i=85");
        assert_eq!(NodeId::parse("i=85").unwrap(), standard);
    }

    #[test]
    fn test_node_id_string_round_trip() {
        let node = NodeId::string(3, "Line1.Motor.Speed");
        assert_eq!(node.to_string(), "ns=3;s=Line1.Motor.Speed");
        assert_eq!(NodeId::parse("ns=3;s=Line1.Motor.Speed").unwrap(), node);
    }

    #[test]
    fn test_node_id_string_with_semicolons() {
        // A string identifier consumes the remainder of the text verbatim.
        let node = NodeId::parse("ns=1;s=a;b=c").unwrap();
        assert_eq!(node.identifier, Identifier::String("a;b=c".to_string()));
        assert_eq!(NodeId::parse(&node.to_string()).unwrap(), node);
    }

    #[test]
    fn test_node_id_guid_round_trip() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let node = NodeId::guid(2, uuid);
        let text = node.to_string();
        assert_eq!(text, "ns=2;g=550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(NodeId::parse(&text).unwrap(), node);
    }

    #[test]
    fn test_node_id_opaque_round_trip() {
        let node = NodeId::opaque(4, vec![1u8, 2, 3, 4]);
        assert_eq!(node.to_string(), "ns=4;b=AQIDBA==");
        assert_eq!(NodeId::parse("ns=4;b=AQIDBA==").unwrap(), node);
    }

    #[test]
    fn test_node_id_null() {
        assert!(NodeId::NULL.is_null());
        assert!(NodeId::string(0, "").is_null());
        assert!(NodeId::guid(0, Uuid::nil()).is_null());
        assert!(!NodeId::numeric(1, 0).is_null());
        assert!(!NodeId::numeric(0, 1).is_null());
    }

    #[test]
    fn test_node_id_parse_errors() {
        assert!(NodeId::parse("").is_err());
        assert!(NodeId::parse("x=1").is_err());
        assert!(NodeId::parse("ns=2").is_err());
        assert!(NodeId::parse("ns=90000;i=1").is_err());
        assert!(NodeId::parse("i=notanumber").is_err());
        assert!(NodeId::parse("g=nope").is_err());
    }

    #[test]
    fn test_uri_escaping_round_trip() {
        let uri = "urn:factory;cell=1;50%";
        let escaped = escape_uri(uri);
        assert_eq!(escaped, "urn:factory%3Bcell=1%3B50%25");
        assert_eq!(unescape_uri(&escaped).unwrap(), uri);
    }

    #[test]
    fn test_uri_unescape_errors() {
        assert!(unescape_uri("abc%").is_err());
        assert!(unescape_uri("abc%zz").is_err());
    }
}
