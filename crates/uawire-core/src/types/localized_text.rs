// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Locale-tagged text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-readable text with an optional RFC 3066 locale tag.
///
/// The reversible JSON form is `{"Locale": .., "Text": ..}`; the
/// non-reversible forms carry the bare text string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Locale tag, empty when unspecified.
    pub locale: String,
    /// The text.
    pub text: String,
}

impl LocalizedText {
    /// Creates localized text.
    #[inline]
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> Self {
        LocalizedText {
            locale: locale.into(),
            text: text.into(),
        }
    }

    /// Creates text with no locale.
    #[inline]
    pub fn from_text(text: impl Into<String>) -> Self {
        LocalizedText {
            locale: String::new(),
            text: text.into(),
        }
    }

    /// Returns `true` if both locale and text are empty.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.locale.is_empty() && self.text.is_empty()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_text_null() {
        assert!(LocalizedText::default().is_null());
        assert!(!LocalizedText::from_text("hello").is_null());
    }
}
