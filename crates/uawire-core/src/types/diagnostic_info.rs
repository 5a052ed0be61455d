// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Recursive diagnostic detail structures.
//!
//! A [`DiagnosticInfo`] carries indexes into a per-response string table
//! plus an optional inner diagnostic for the underlying cause. The nesting
//! of inner diagnostics is capped at [`DiagnosticInfo::MAX_INNER_DEPTH`]:
//! both codecs fail with `BadEncodingLimitsExceeded` beyond that depth
//! rather than truncating.

use serde::{Deserialize, Serialize};

use crate::status::StatusCode;

/// Diagnostic detail for a service result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// Index of the symbolic id in the response string table.
    pub symbolic_id: Option<i32>,
    /// Index of the namespace URI in the response string table.
    pub namespace_uri: Option<i32>,
    /// Index of the locale in the response string table.
    pub locale: Option<i32>,
    /// Index of the localized text in the response string table.
    pub localized_text: Option<i32>,
    /// Vendor-specific detail text.
    pub additional_info: Option<String>,
    /// Status code of the underlying operation.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic for the underlying cause.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl DiagnosticInfo {
    /// Maximum depth of `inner_diagnostic_info` chains accepted by the
    /// codecs.
    pub const MAX_INNER_DEPTH: u32 = 5;

    /// Returns `true` if no field is set.
    pub fn is_null(&self) -> bool {
        self.symbolic_id.is_none()
            && self.namespace_uri.is_none()
            && self.locale.is_none()
            && self.localized_text.is_none()
            && self.additional_info.is_none()
            && self.inner_status_code.is_none()
            && self.inner_diagnostic_info.is_none()
    }

    /// Returns the depth of the inner diagnostic chain (0 when there is no
    /// inner diagnostic).
    pub fn inner_depth(&self) -> u32 {
        match &self.inner_diagnostic_info {
            Some(inner) => 1 + inner.inner_depth(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: u32) -> DiagnosticInfo {
        let mut info = DiagnosticInfo {
            symbolic_id: Some(1),
            ..Default::default()
        };
        for _ in 0..depth {
            info = DiagnosticInfo {
                inner_diagnostic_info: Some(Box::new(info)),
                ..Default::default()
            };
        }
        info
    }

    #[test]
    fn test_diagnostic_info_depth() {
        assert_eq!(chain(0).inner_depth(), 0);
        assert_eq!(chain(3).inner_depth(), 3);
    }

    #[test]
    fn test_diagnostic_info_null() {
        assert!(DiagnosticInfo::default().is_null());
        assert!(!chain(0).is_null());
    }
}
