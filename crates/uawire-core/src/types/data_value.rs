// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Values with quality and provenance.

use crate::status::StatusCode;
use crate::types::date_time::UaDateTime;
use crate::variant::Variant;

/// A variant value together with its status code and source/server
/// timestamps.
///
/// Every field is individually defaultable and individually omitted on the
/// JSON wire when default-valued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataValue {
    /// The value.
    pub value: Variant,
    /// Quality of the value; `Good` when omitted.
    pub status: StatusCode,
    /// Instant the source produced the value.
    pub source_timestamp: Option<UaDateTime>,
    /// Picosecond refinement of the source timestamp.
    pub source_picoseconds: u16,
    /// Instant the server observed the value.
    pub server_timestamp: Option<UaDateTime>,
    /// Picosecond refinement of the server timestamp.
    pub server_picoseconds: u16,
}

impl DataValue {
    /// Creates a good-quality data value with no timestamps.
    #[inline]
    pub fn new(value: Variant) -> Self {
        DataValue {
            value,
            ..Default::default()
        }
    }

    /// Creates a data value carrying only a status code.
    #[inline]
    pub fn from_status(status: StatusCode) -> Self {
        DataValue {
            status,
            ..Default::default()
        }
    }

    /// Returns `true` if every field holds its default.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
            && self.status == StatusCode::GOOD
            && self.source_timestamp.is_none()
            && self.server_timestamp.is_none()
            && self.source_picoseconds == 0
            && self.server_picoseconds == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_value_null() {
        assert!(DataValue::default().is_null());
        assert!(!DataValue::new(Variant::from(1i32)).is_null());
        assert!(!DataValue::from_status(StatusCode::BAD_TIMEOUT).is_null());
    }
}
