// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Namespace-qualified names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// A name qualified by a namespace index, text form `<ns>:<name>` (the
/// prefix is omitted for namespace 0).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Namespace index of the name.
    pub namespace: u16,
    /// The unqualified name.
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[inline]
    pub fn new(namespace: u16, name: impl Into<String>) -> Self {
        QualifiedName {
            namespace,
            name: name.into(),
        }
    }

    /// Returns `true` if this is the null value (empty name, namespace 0).
    #[inline]
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.name.is_empty()
    }

    /// Parses the `<ns>:<name>` text form. A name with no numeric prefix is
    /// taken verbatim in namespace 0; the name portion may contain `:`.
    pub fn parse(text: &str) -> EncodingResult<Self> {
        if let Some((prefix, rest)) = text.split_once(':') {
            if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
                let namespace = prefix.parse::<u16>().map_err(|_| {
                    EncodingError::decoding(format!("invalid namespace index in '{text}'"))
                })?;
                return Ok(QualifiedName::new(namespace, rest));
            }
        }
        Ok(QualifiedName::new(0, text))
    }
}

impl FromStr for QualifiedName {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualifiedName::parse(s)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "{}:{}", self.namespace, self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_round_trip() {
        let name = QualifiedName::new(2, "Temperature");
        assert_eq!(name.to_string(), "2:Temperature");
        assert_eq!(QualifiedName::parse("2:Temperature").unwrap(), name);

        let plain = QualifiedName::new(0, "Objects");
        assert_eq!(plain.to_string(), "Objects");
        assert_eq!(QualifiedName::parse("Objects").unwrap(), plain);
    }

    #[test]
    fn test_qualified_name_colon_in_name() {
        let parsed = QualifiedName::parse("urn:not-a-namespace").unwrap();
        assert_eq!(parsed.namespace, 0);
        assert_eq!(parsed.name, "urn:not-a-namespace");
    }

    #[test]
    fn test_qualified_name_null() {
        assert!(QualifiedName::default().is_null());
        assert!(!QualifiedName::new(1, "").is_null());
    }
}
