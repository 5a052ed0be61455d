// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node identifiers with cross-namespace and cross-server addressing.
//!
//! An [`ExpandedNodeId`] wraps a [`NodeId`] and optionally carries the
//! namespace as an explicit URI instead of a table index, plus a server
//! index for ids that refer to a node on another server.
//!
//! The compact text grammar extends the node id grammar with optional
//! prefixes, in this order:
//!
//! ```text
//! [svr=<n>;][svu=<uri>;][nsu=<uri>;][ns=<n>;]<idtype-prefix><id>
//! ```
//!
//! URIs embedded in the text have `%` and `;` escaped as `%25` / `%3B`.
//!
//! # Examples
//!
//! ```
//! use uawire_core::types::ExpandedNodeId;
//!
//! let id: ExpandedNodeId = "svr=1;nsu=urn:factory:cell1;s=Motor".parse().unwrap();
//! assert_eq!(id.server_index, 1);
//! assert_eq!(id.namespace_uri.as_deref(), Some("urn:factory:cell1"));
//! assert!(id.is_absolute());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};
use crate::tables::StringTable;
use crate::types::node_id::{
    escape_uri, parse_identifier, parse_namespace_prefix, unescape_uri, NodeId,
};

// =============================================================================
// ExpandedNodeId
// =============================================================================

/// A node id extended with a namespace URI and a server index.
///
/// When `namespace_uri` is set, the namespace is carried by the URI and the
/// inner node id's namespace index must be zero. Immutable value type; the
/// empty value is [`ExpandedNodeId::NULL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    /// The inner node id.
    pub node_id: NodeId,
    /// Explicit namespace URI; `None` when the namespace is carried by the
    /// inner index.
    pub namespace_uri: Option<String>,
    /// Index into the server table; 0 is the local server.
    pub server_index: u32,
}

impl ExpandedNodeId {
    /// The null expanded node id.
    pub const NULL: ExpandedNodeId = ExpandedNodeId {
        node_id: NodeId::NULL,
        namespace_uri: None,
        server_index: 0,
    };

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Wraps a node id with no URI and the local server index.
    #[inline]
    pub const fn new(node_id: NodeId) -> Self {
        ExpandedNodeId {
            node_id,
            namespace_uri: None,
            server_index: 0,
        }
    }

    /// Wraps a node id with an explicit namespace URI.
    ///
    /// The inner namespace index is cleared to zero, as the namespace is
    /// carried by the URI.
    pub fn with_namespace_uri(node_id: NodeId, uri: impl Into<String>) -> Self {
        ExpandedNodeId {
            node_id: node_id.with_namespace(0),
            namespace_uri: Some(uri.into()),
            server_index: 0,
        }
    }

    /// Returns a copy with the server index replaced.
    #[inline]
    pub fn with_server_index(mut self, server_index: u32) -> Self {
        self.server_index = server_index;
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if this id addresses outside the local namespace
    /// table: a non-empty namespace URI or a non-zero server index.
    pub fn is_absolute(&self) -> bool {
        self.namespace_uri.as_deref().is_some_and(|u| !u.is_empty()) || self.server_index > 0
    }

    /// Returns `true` if this is the null value.
    pub fn is_null(&self) -> bool {
        self.node_id.is_null() && !self.is_absolute()
    }

    /// Verifies the URI/index exclusivity invariant. Checked in debug builds
    /// on every decode path.
    #[inline]
    pub(crate) fn debug_check_invariant(&self) {
        debug_assert!(
            self.namespace_uri.is_none() || self.node_id.namespace == 0,
            "namespace carried by uri must leave the inner index zero"
        );
    }

    // =========================================================================
    // Text grammar
    // =========================================================================

    /// Parses the compact text form.
    ///
    /// An `svu=` (server URI) prefix cannot be resolved without a server
    /// table; use [`ExpandedNodeId::parse_with_tables`] for that form.
    pub fn parse(text: &str) -> EncodingResult<Self> {
        Self::parse_inner(text, None)
    }

    /// Parses the compact text form, resolving an `svu=<uri>;` prefix to a
    /// server index through `servers`.
    pub fn parse_with_tables(text: &str, servers: &StringTable) -> EncodingResult<Self> {
        Self::parse_inner(text, Some(servers))
    }

    fn parse_inner(text: &str, servers: Option<&StringTable>) -> EncodingResult<Self> {
        let mut rest = text;
        let mut server_index = 0u32;

        if let Some(tail) = rest.strip_prefix("svr=") {
            let end = tail.find(';').ok_or_else(|| {
                EncodingError::node_id_invalid(format!("missing ';' after svr= in '{text}'"))
            })?;
            server_index = tail[..end].parse::<u32>().map_err(|_| {
                EncodingError::node_id_invalid(format!("invalid server index in '{text}'"))
            })?;
            rest = &tail[end + 1..];
        }

        if let Some(tail) = rest.strip_prefix("svu=") {
            let end = tail.find(';').ok_or_else(|| {
                EncodingError::node_id_invalid(format!("missing ';' after svu= in '{text}'"))
            })?;
            let uri = unescape_uri(&tail[..end])?;
            let servers = servers.ok_or_else(|| {
                EncodingError::node_id_invalid(format!(
                    "cannot resolve server uri '{uri}' without a server table"
                ))
            })?;
            server_index = u32::from(servers.index_of(&uri).ok_or_else(|| {
                EncodingError::node_id_invalid(format!("unknown server uri '{uri}'"))
            })?);
            rest = &tail[end + 1..];
        }

        let mut namespace_uri = None;
        if let Some(tail) = rest.strip_prefix("nsu=") {
            let end = tail.find(';').ok_or_else(|| {
                EncodingError::node_id_invalid(format!("missing ';' after nsu= in '{text}'"))
            })?;
            namespace_uri = Some(unescape_uri(&tail[..end])?);
            rest = &tail[end + 1..];
        }

        let (namespace, rest) = parse_namespace_prefix(rest)?;
        let identifier = parse_identifier(rest, text)?;

        let expanded = ExpandedNodeId {
            node_id: NodeId {
                namespace: if namespace_uri.is_some() { 0 } else { namespace },
                identifier,
            },
            namespace_uri,
            server_index,
        };
        expanded.debug_check_invariant();
        Ok(expanded)
    }
}

impl Default for ExpandedNodeId {
    #[inline]
    fn default() -> Self {
        Self::NULL
    }
}

impl From<NodeId> for ExpandedNodeId {
    #[inline]
    fn from(node_id: NodeId) -> Self {
        ExpandedNodeId::new(node_id)
    }
}

impl FromStr for ExpandedNodeId {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpandedNodeId::parse(s)
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server_index > 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        if let Some(uri) = &self.namespace_uri {
            write!(f, "nsu={};", escape_uri(uri))?;
        }
        write!(f, "{}", self.node_id)
    }
}

// Ordering: server index first, then namespace URI (absent first, ordinal),
// then the inner node id. Preserved exactly for downstream sort stability.
impl Ord for ExpandedNodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.server_index
            .cmp(&other.server_index)
            .then_with(|| self.namespace_uri.cmp(&other.namespace_uri))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl PartialOrd for ExpandedNodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_plain_round_trip() {
        let id = ExpandedNodeId::new(NodeId::numeric(2, 1001));
        assert_eq!(id.to_string(), "ns=2;i=1001");
        assert_eq!(ExpandedNodeId::parse("ns=2;i=1001").unwrap(), id);
        assert!(!id.is_absolute());
    }

    #[test]
    fn test_expanded_uri_round_trip() {
        let id = ExpandedNodeId::with_namespace_uri(NodeId::string(0, "Motor"), "urn:factory:cell1");
        let text = id.to_string();
        assert_eq!(text, "nsu=urn:factory:cell1;s=Motor");
        assert_eq!(ExpandedNodeId::parse(&text).unwrap(), id);
        assert!(id.is_absolute());
    }

    #[test]
    fn test_expanded_server_index_round_trip() {
        let id = ExpandedNodeId::new(NodeId::numeric(3, 42)).with_server_index(7);
        let text = id.to_string();
        assert_eq!(text, "svr=7;ns=3;i=42");
        assert_eq!(ExpandedNodeId::parse(&text).unwrap(), id);
    }

    #[test]
    fn test_expanded_escaped_uri_round_trip() {
        let id = ExpandedNodeId::with_namespace_uri(
            NodeId::numeric(0, 5),
            "urn:odd;uri:50%",
        );
        let text = id.to_string();
        assert_eq!(text, "nsu=urn:odd%3Buri:50%25;i=5");
        assert_eq!(ExpandedNodeId::parse(&text).unwrap(), id);
    }

    #[test]
    fn test_expanded_server_uri_needs_table() {
        assert!(ExpandedNodeId::parse("svu=urn:server:a;i=1").is_err());

        let mut servers = StringTable::new();
        servers.append("urn:server:local");
        servers.append("urn:server:a");
        let id = ExpandedNodeId::parse_with_tables("svu=urn:server:a;i=1", &servers).unwrap();
        assert_eq!(id.server_index, 1);
    }

    #[test]
    fn test_expanded_ordering() {
        let local = ExpandedNodeId::new(NodeId::numeric(0, 1));
        let by_uri = ExpandedNodeId::with_namespace_uri(NodeId::numeric(0, 1), "urn:a");
        let remote = ExpandedNodeId::new(NodeId::numeric(0, 1)).with_server_index(1);

        // Absent URI sorts before any URI; server index dominates both.
        assert!(local < by_uri);
        assert!(by_uri < remote);
        let mut ids = vec![remote.clone(), by_uri.clone(), local.clone()];
        ids.sort();
        assert_eq!(ids, vec![local, by_uri, remote]);
    }

    #[test]
    fn test_expanded_null() {
        assert!(ExpandedNodeId::NULL.is_null());
        assert!(!ExpandedNodeId::NULL.is_absolute());
        assert!(ExpandedNodeId::default().is_null());
    }
}
