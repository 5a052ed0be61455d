// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA status codes.
//!
//! A [`StatusCode`] is a 32-bit value whose top two bits carry the severity
//! (Good / Uncertain / Bad) and whose upper 16 bits identify the condition.
//! This module defines the named codes the codecs emit and the symbolic
//! lookup used by the non-reversible JSON `{Code, Symbol}` encoding.
//!
//! # Examples
//!
//! ```
//! use uawire_core::status::StatusCode;
//!
//! let status = StatusCode::BAD_DECODING_ERROR;
//! assert!(status.is_bad());
//! assert_eq!(status.symbol(), Some("BadDecodingError"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// StatusCode
// =============================================================================

/// A 32-bit OPC UA status code.
///
/// The default value is [`StatusCode::GOOD`] (zero).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(u32);

impl StatusCode {
    /// Operation succeeded.
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);

    /// Operation outcome is uncertain.
    pub const UNCERTAIN: StatusCode = StatusCode(0x4000_0000);

    /// Operation failed (generic).
    pub const BAD: StatusCode = StatusCode(0x8000_0000);

    /// An unexpected internal error occurred.
    pub const BAD_UNEXPECTED_ERROR: StatusCode = StatusCode(0x8001_0000);

    /// An internal error occurred as a result of a programming or
    /// configuration error.
    pub const BAD_INTERNAL_ERROR: StatusCode = StatusCode(0x8002_0000);

    /// There are not enough resources to process the request.
    pub const BAD_OUT_OF_MEMORY: StatusCode = StatusCode(0x8003_0000);

    /// The input document could not be encoded.
    pub const BAD_ENCODING_ERROR: StatusCode = StatusCode(0x8006_0000);

    /// The input stream is malformed and could not be decoded.
    pub const BAD_DECODING_ERROR: StatusCode = StatusCode(0x8007_0000);

    /// A string, array, message size or nesting depth exceeded a
    /// configured encoding limit.
    pub const BAD_ENCODING_LIMITS_EXCEEDED: StatusCode = StatusCode(0x8008_0000);

    /// The request message size exceeds limits set by the server.
    pub const BAD_REQUEST_TOO_LARGE: StatusCode = StatusCode(0x80B8_0000);

    /// The operation timed out.
    pub const BAD_TIMEOUT: StatusCode = StatusCode(0x800A_0000);

    /// The requested operation is not supported.
    pub const BAD_NOT_SUPPORTED: StatusCode = StatusCode(0x803D_0000);

    /// The node id refers to a node that does not exist, or the node id
    /// text/structure is malformed.
    pub const BAD_NODE_ID_INVALID: StatusCode = StatusCode(0x8033_0000);

    /// The data type of the value is not supported for this operation.
    pub const BAD_TYPE_MISMATCH: StatusCode = StatusCode(0x8074_0000);

    /// The syntax of the supplied text is invalid.
    pub const BAD_SYNTAX_ERROR: StatusCode = StatusCode(0x80B6_0000);

    // =========================================================================
    // Construction & Access
    // =========================================================================

    /// Creates a status code from its raw 32-bit representation.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        StatusCode(bits)
    }

    /// Returns the raw 32-bit representation.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the code portion (severity + condition, info bits masked off).
    #[inline]
    pub const fn code(self) -> u32 {
        self.0 & 0xFFFF_0000
    }

    // =========================================================================
    // Severity
    // =========================================================================

    /// Returns `true` if the severity is Good.
    #[inline]
    pub const fn is_good(self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// Returns `true` if the severity is Uncertain.
    #[inline]
    pub const fn is_uncertain(self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// Returns `true` if the severity is Bad.
    #[inline]
    pub const fn is_bad(self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    // =========================================================================
    // Symbolic Names
    // =========================================================================

    /// Returns the symbolic name for this code, if it is one of the named
    /// constants defined here.
    ///
    /// Used by the non-reversible JSON encoding, which writes status codes
    /// as `{"Code": <bits>, "Symbol": <name>}`.
    pub fn symbol(self) -> Option<&'static str> {
        match StatusCode(self.code()) {
            Self::GOOD => Some("Good"),
            Self::UNCERTAIN => Some("Uncertain"),
            Self::BAD => Some("Bad"),
            Self::BAD_UNEXPECTED_ERROR => Some("BadUnexpectedError"),
            Self::BAD_INTERNAL_ERROR => Some("BadInternalError"),
            Self::BAD_OUT_OF_MEMORY => Some("BadOutOfMemory"),
            Self::BAD_ENCODING_ERROR => Some("BadEncodingError"),
            Self::BAD_DECODING_ERROR => Some("BadDecodingError"),
            Self::BAD_ENCODING_LIMITS_EXCEEDED => Some("BadEncodingLimitsExceeded"),
            Self::BAD_REQUEST_TOO_LARGE => Some("BadRequestTooLarge"),
            Self::BAD_TIMEOUT => Some("BadTimeout"),
            Self::BAD_NOT_SUPPORTED => Some("BadNotSupported"),
            Self::BAD_NODE_ID_INVALID => Some("BadNodeIdInvalid"),
            Self::BAD_TYPE_MISMATCH => Some("BadTypeMismatch"),
            Self::BAD_SYNTAX_ERROR => Some("BadSyntaxError"),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(name) => write!(f, "{} (0x{:08X})", name, self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

impl From<u32> for StatusCode {
    #[inline]
    fn from(bits: u32) -> Self {
        StatusCode(bits)
    }
}

impl From<StatusCode> for u32 {
    #[inline]
    fn from(status: StatusCode) -> Self {
        status.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity() {
        assert!(StatusCode::GOOD.is_good());
        assert!(!StatusCode::GOOD.is_bad());
        assert!(StatusCode::UNCERTAIN.is_uncertain());
        assert!(StatusCode::BAD_DECODING_ERROR.is_bad());
        assert!(!StatusCode::BAD_DECODING_ERROR.is_good());
    }

    #[test]
    fn test_status_symbol_lookup() {
        assert_eq!(StatusCode::GOOD.symbol(), Some("Good"));
        assert_eq!(
            StatusCode::BAD_ENCODING_LIMITS_EXCEEDED.symbol(),
            Some("BadEncodingLimitsExceeded")
        );
        // Info bits do not affect the lookup.
        let with_info_bits = StatusCode::from_bits(StatusCode::BAD_TIMEOUT.bits() | 0x0400);
        assert_eq!(with_info_bits.symbol(), Some("BadTimeout"));
        assert_eq!(StatusCode::from_bits(0x8123_0000).symbol(), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            StatusCode::BAD_DECODING_ERROR.to_string(),
            "BadDecodingError (0x80070000)"
        );
        assert_eq!(StatusCode::from_bits(0x8123_0000).to_string(), "0x81230000");
    }

    #[test]
    fn test_status_round_trip_bits() {
        let status = StatusCode::from_bits(0x8007_0000);
        assert_eq!(status, StatusCode::BAD_DECODING_ERROR);
        assert_eq!(u32::from(status), 0x8007_0000);
    }
}
