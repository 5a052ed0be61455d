// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Interned string tables for namespace and server URIs.
//!
//! A [`StringTable`] is an append-only list of URIs with O(1) index lookup.
//! The codecs consult these tables when a message was encoded against a
//! different table than the local one: [`StringTable::create_mapping`]
//! produces the index-translation vector the decoders apply.
//!
//! Tables are plain values with no internal locking. Decoders that append
//! newly-seen URIs (`update_namespace_table` mode) work on their own copy;
//! sharing a table across concurrent decodes requires treating it as a
//! read-only snapshot.

use serde::{Deserialize, Serialize};

/// URI of the OPC UA standard namespace, always index 0 of a namespace table.
pub const STANDARD_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

// =============================================================================
// StringTable
// =============================================================================

/// An append-only table of interned strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Creates an empty table.
    #[inline]
    pub fn new() -> Self {
        StringTable::default()
    }

    /// Creates a table from an ordered list of strings.
    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringTable {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a string and returns its index. If the string is already
    /// present, returns the existing index instead of growing the table.
    pub fn append(&mut self, value: impl Into<String>) -> u16 {
        let value = value.into();
        if let Some(index) = self.index_of(&value) {
            return index;
        }
        self.strings.push(value);
        (self.strings.len() - 1) as u16
    }

    /// Returns the string at `index`, if present.
    #[inline]
    pub fn get(&self, index: u16) -> Option<&str> {
        self.strings.get(usize::from(index)).map(String::as_str)
    }

    /// Returns the index of `value`, if present.
    pub fn index_of(&self, value: &str) -> Option<u16> {
        self.strings.iter().position(|s| s == value).map(|i| i as u16)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterates the entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Builds the index-translation vector from this (source) table into
    /// `target`: element `i` is the target index of source entry `i`, or
    /// `None` when the target table does not contain that string.
    pub fn create_mapping(&self, target: &StringTable) -> Vec<Option<u16>> {
        self.strings
            .iter()
            .map(|uri| target.index_of(uri))
            .collect()
    }
}

// =============================================================================
// NamespaceTable
// =============================================================================

/// A string table whose index 0 is pinned to the OPC UA standard namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceTable {
    table: StringTable,
}

impl NamespaceTable {
    /// Creates a table containing only the standard namespace.
    pub fn new() -> Self {
        NamespaceTable {
            table: StringTable::from_strings([STANDARD_NAMESPACE_URI]),
        }
    }

    /// Creates a table from application namespace URIs, appended after the
    /// standard namespace.
    pub fn from_uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut namespaces = Self::new();
        for uri in uris {
            namespaces.table.append(uri);
        }
        namespaces
    }

    /// Appends a URI and returns its index (existing index if present).
    #[inline]
    pub fn append(&mut self, uri: impl Into<String>) -> u16 {
        self.table.append(uri)
    }

    /// Returns the URI at `index`, if present.
    #[inline]
    pub fn get(&self, index: u16) -> Option<&str> {
        self.table.get(index)
    }

    /// Returns the index of `uri`, if present.
    #[inline]
    pub fn index_of(&self, uri: &str) -> Option<u16> {
        self.table.index_of(uri)
    }

    /// Returns the number of entries (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Never `true`: index 0 always holds the standard namespace.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// See [`StringTable::create_mapping`].
    pub fn create_mapping(&self, target: &NamespaceTable) -> Vec<Option<u16>> {
        self.table.create_mapping(&target.table)
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_table_append_dedup() {
        let mut table = StringTable::new();
        assert_eq!(table.append("urn:a"), 0);
        assert_eq!(table.append("urn:b"), 1);
        assert_eq!(table.append("urn:a"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("urn:b"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_namespace_table_standard_index() {
        let namespaces = NamespaceTable::new();
        assert_eq!(namespaces.get(0), Some(STANDARD_NAMESPACE_URI));

        let with_apps = NamespaceTable::from_uris(["urn:app:1", "urn:app:2"]);
        assert_eq!(with_apps.index_of("urn:app:1"), Some(1));
        assert_eq!(with_apps.index_of("urn:app:2"), Some(2));
    }

    #[test]
    fn test_create_mapping() {
        let source = NamespaceTable::from_uris(["urn:a", "urn:b"]);
        let target = NamespaceTable::from_uris(["urn:b", "urn:c", "urn:a"]);

        let mapping = source.create_mapping(&target);
        assert_eq!(mapping, vec![Some(0), Some(3), Some(1)]);

        let reverse = target.create_mapping(&source);
        assert_eq!(reverse, vec![Some(0), Some(2), None, Some(1)]);
    }
}
