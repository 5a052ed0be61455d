// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Protocol timestamps.
//!
//! [`UaDateTime`] wraps a UTC [`chrono::DateTime`] and pins down the wire
//! conventions the codecs rely on:
//!
//! - the binary wire carries 100 ns ticks since 1601-01-01 (the protocol
//!   epoch), clamped to the representable range;
//! - the JSON wire carries an ISO-8601 timestamp with the fractional part
//!   trimmed of trailing zeros;
//! - `9999-12-31T23:59:59Z` is the "end of time" sentinel: any instant at or
//!   beyond it encodes as that literal, and decoding that literal yields the
//!   max sentinel value, not the parsed instant.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// Seconds between the protocol epoch (1601-01-01) and the Unix epoch.
const EPOCH_DIFF_SECONDS: i64 = 11_644_473_600;

/// 100 ns ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Unix seconds of the minimum representable instant (1601-01-01T00:00:00Z).
const MIN_UNIX_SECONDS: i64 = -EPOCH_DIFF_SECONDS;

/// Unix seconds of the maximum representable instant (9999-12-31T23:59:59Z).
const MAX_UNIX_SECONDS: i64 = 253_402_300_799;

/// Wire text of the minimum sentinel.
const MIN_WIRE_TEXT: &str = "1601-01-01T00:00:00Z";

/// Wire text of the maximum sentinel.
const MAX_WIRE_TEXT: &str = "9999-12-31T23:59:59Z";

// =============================================================================
// UaDateTime
// =============================================================================

/// An instant in time with protocol min/max sentinel semantics.
///
/// The default value is the minimum sentinel, which is also the wire default
/// (an omitted JSON field or a zero binary tick count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UaDateTime(DateTime<Utc>);

impl UaDateTime {
    /// Returns the minimum representable instant (the protocol epoch).
    pub fn min_value() -> Self {
        UaDateTime(
            Utc.timestamp_opt(MIN_UNIX_SECONDS, 0)
                .single()
                .expect("protocol epoch is a valid instant"),
        )
    }

    /// Returns the maximum representable instant (the "end of time" sentinel).
    pub fn max_value() -> Self {
        UaDateTime(
            Utc.timestamp_opt(MAX_UNIX_SECONDS, 0)
                .single()
                .expect("protocol max instant is valid"),
        )
    }

    /// Returns the current instant.
    #[inline]
    pub fn now() -> Self {
        UaDateTime::from(Utc::now())
    }

    /// Returns the wrapped chrono instant.
    #[inline]
    pub fn as_chrono(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns `true` if this is the minimum sentinel (the wire default).
    #[inline]
    pub fn is_min(&self) -> bool {
        *self == Self::min_value()
    }

    // =========================================================================
    // Binary wire form (ticks)
    // =========================================================================

    /// Creates an instant from 100 ns ticks since the protocol epoch.
    ///
    /// Negative tick counts clamp to the minimum sentinel; tick counts at or
    /// beyond the maximum instant clamp to the maximum sentinel.
    pub fn from_ticks(ticks: i64) -> Self {
        if ticks <= 0 {
            return Self::min_value();
        }
        if ticks >= Self::max_value().ticks() {
            return Self::max_value();
        }
        let seconds = MIN_UNIX_SECONDS + ticks / TICKS_PER_SECOND;
        let nanos = (ticks % TICKS_PER_SECOND) as u32 * 100;
        match Utc.timestamp_opt(seconds, nanos).single() {
            Some(instant) => UaDateTime(instant),
            None => Self::max_value(),
        }
    }

    /// Returns the 100 ns tick count since the protocol epoch, clamped to
    /// the representable range.
    pub fn ticks(&self) -> i64 {
        let seconds = self.0.timestamp();
        if seconds <= MIN_UNIX_SECONDS {
            return 0;
        }
        let whole = (seconds - MIN_UNIX_SECONDS).saturating_mul(TICKS_PER_SECOND);
        let frac = i64::from(self.0.timestamp_subsec_nanos()) / 100;
        whole.saturating_add(frac)
    }

    // =========================================================================
    // JSON wire form (text)
    // =========================================================================

    /// Parses a wire timestamp.
    ///
    /// Instants at or beyond the maximum sentinel decode as the sentinel;
    /// instants at or before the minimum decode as the minimum. Malformed
    /// text is a decoding error.
    pub fn parse(text: &str) -> EncodingResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(text)
            .map_err(|e| EncodingError::decoding(format!("invalid timestamp '{text}': {e}")))?
            .with_timezone(&Utc);
        Ok(Self::from(parsed))
    }

    /// Formats the canonical wire timestamp.
    ///
    /// Fixed-width date and time with the sub-second fraction trimmed of
    /// trailing zeros and omitted entirely when zero.
    pub fn to_wire_string(&self) -> String {
        let clamped = *self;
        if clamped >= Self::max_value() {
            return MAX_WIRE_TEXT.to_string();
        }
        if clamped <= Self::min_value() {
            return MIN_WIRE_TEXT.to_string();
        }
        let base = clamped.0.format("%Y-%m-%dT%H:%M:%S").to_string();
        let nanos = clamped.0.timestamp_subsec_nanos();
        if nanos == 0 {
            return format!("{base}Z");
        }
        let mut fraction = format!("{nanos:09}");
        while fraction.ends_with('0') {
            fraction.pop();
        }
        format!("{base}.{fraction}Z")
    }
}

impl Default for UaDateTime {
    #[inline]
    fn default() -> Self {
        Self::min_value()
    }
}

impl From<DateTime<Utc>> for UaDateTime {
    /// Clamps the instant into the representable range.
    fn from(instant: DateTime<Utc>) -> Self {
        let value = UaDateTime(instant);
        if value >= Self::max_value() {
            Self::max_value()
        } else if value <= Self::min_value() {
            Self::min_value()
        } else {
            value
        }
    }
}

impl fmt::Display for UaDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_default_is_min() {
        assert!(UaDateTime::default().is_min());
        assert_eq!(UaDateTime::default().ticks(), 0);
        assert_eq!(UaDateTime::default().to_wire_string(), MIN_WIRE_TEXT);
    }

    #[test]
    fn test_datetime_tick_round_trip() {
        let instant = UaDateTime::parse("2024-06-01T12:30:45.5Z").unwrap();
        let ticks = instant.ticks();
        assert_eq!(UaDateTime::from_ticks(ticks), instant);
    }

    #[test]
    fn test_datetime_max_sentinel_text() {
        // The max sentinel always formats as the literal, and instants past
        // the sentinel clamp to it.
        assert_eq!(UaDateTime::max_value().to_wire_string(), MAX_WIRE_TEXT);
        let beyond = UaDateTime::parse("9999-12-31T23:59:59.9Z").unwrap();
        assert_eq!(beyond, UaDateTime::max_value());
        let decoded = UaDateTime::parse(MAX_WIRE_TEXT).unwrap();
        assert_eq!(decoded, UaDateTime::max_value());
    }

    #[test]
    fn test_datetime_fraction_trimming() {
        let instant = UaDateTime::parse("2024-06-01T00:00:00.120000000Z").unwrap();
        assert_eq!(instant.to_wire_string(), "2024-06-01T00:00:00.12Z");
        let whole = UaDateTime::parse("2024-06-01T00:00:00.000Z").unwrap();
        assert_eq!(whole.to_wire_string(), "2024-06-01T00:00:00Z");
    }

    #[test]
    fn test_datetime_negative_ticks_clamp() {
        assert_eq!(UaDateTime::from_ticks(-5), UaDateTime::min_value());
        assert_eq!(UaDateTime::from_ticks(i64::MAX), UaDateTime::max_value());
    }

    #[test]
    fn test_datetime_invalid_text() {
        assert!(UaDateTime::parse("not a date").is_err());
    }
}
