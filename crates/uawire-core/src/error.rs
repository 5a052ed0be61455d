// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Codec error types.
//!
//! Every failure raised by the encoders and decoders is an [`EncodingError`]
//! and maps onto exactly one protocol [`StatusCode`]:
//!
//! ```text
//! EncodingError
//! ├── Decoding        - malformed token shape, bad text      -> BadDecodingError
//! ├── Encoding        - value cannot be written              -> BadEncodingError
//! ├── LimitsExceeded  - string/array/message/nesting limits  -> BadEncodingLimitsExceeded
//! ├── NotSupported    - no built-in type mapping, bad policy -> BadNotSupported
//! └── NodeIdInvalid   - malformed node id, unknown namespace -> BadNodeIdInvalid
//! ```
//!
//! Missing fields are **not** errors: decoders treat absence as the type's
//! default value. Limit violations are always fatal to the current operation,
//! never downgraded to a truncated result.
//!
//! # Examples
//!
//! ```
//! use uawire_core::error::EncodingError;
//! use uawire_core::status::StatusCode;
//!
//! let error = EncodingError::limits_exceeded("array length 70000 exceeds maximum 65535");
//! assert_eq!(error.status_code(), StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
//! ```

use thiserror::Error;

use crate::status::StatusCode;

/// Result alias used throughout the codecs.
pub type EncodingResult<T> = Result<T, EncodingError>;

// =============================================================================
// EncodingError
// =============================================================================

/// The unified error type for encode and decode operations.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The input stream is malformed: bad token shape, unparseable
    /// Guid/DateTime/number text, or a reader-level syntax error.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// A value could not be written to the output stream.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A configured encoding limit (string length, byte-string length,
    /// array length, message size or nesting depth) was exceeded.
    #[error("encoding limits exceeded: {0}")]
    LimitsExceeded(String),

    /// The value has no built-in type mapping, or an encoder policy that is
    /// fixed for the active encoding mode was mutated.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A node id is malformed, or a namespace/server URI has no mapping in
    /// the target table while strict (non-appending) mode is active.
    #[error("invalid node id: {0}")]
    NodeIdInvalid(String),
}

impl EncodingError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a decoding error.
    #[inline]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding(message.into())
    }

    /// Creates an encoding error.
    #[inline]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Creates a limits-exceeded error.
    #[inline]
    pub fn limits_exceeded(message: impl Into<String>) -> Self {
        Self::LimitsExceeded(message.into())
    }

    /// Creates a not-supported error.
    #[inline]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Creates an invalid-node-id error.
    #[inline]
    pub fn node_id_invalid(message: impl Into<String>) -> Self {
        Self::NodeIdInvalid(message.into())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the protocol status code corresponding to this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decoding(_) => StatusCode::BAD_DECODING_ERROR,
            Self::Encoding(_) => StatusCode::BAD_ENCODING_ERROR,
            Self::LimitsExceeded(_) => StatusCode::BAD_ENCODING_LIMITS_EXCEEDED,
            Self::NotSupported(_) => StatusCode::BAD_NOT_SUPPORTED,
            Self::NodeIdInvalid(_) => StatusCode::BAD_NODE_ID_INVALID,
        }
    }

    /// Returns `true` if this error was raised by a configured limit.
    #[inline]
    pub fn is_limit_violation(&self) -> bool {
        matches!(self, Self::LimitsExceeded(_))
    }
}

impl From<serde_json::Error> for EncodingError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decoding(format!("json syntax error: {error}"))
    }
}

impl From<base64::DecodeError> for EncodingError {
    fn from(error: base64::DecodeError) -> Self {
        Self::Decoding(format!("invalid base64: {error}"))
    }
}

impl From<uuid::Error> for EncodingError {
    fn from(error: uuid::Error) -> Self {
        Self::Decoding(format!("invalid guid: {error}"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_code_mapping() {
        assert_eq!(
            EncodingError::decoding("x").status_code(),
            StatusCode::BAD_DECODING_ERROR
        );
        assert_eq!(
            EncodingError::limits_exceeded("x").status_code(),
            StatusCode::BAD_ENCODING_LIMITS_EXCEEDED
        );
        assert_eq!(
            EncodingError::not_supported("x").status_code(),
            StatusCode::BAD_NOT_SUPPORTED
        );
        assert_eq!(
            EncodingError::node_id_invalid("x").status_code(),
            StatusCode::BAD_NODE_ID_INVALID
        );
    }

    #[test]
    fn test_error_limit_predicate() {
        assert!(EncodingError::limits_exceeded("x").is_limit_violation());
        assert!(!EncodingError::decoding("x").is_limit_violation());
    }

    #[test]
    fn test_error_from_json_error() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = EncodingError::from(parse_error);
        assert_eq!(error.status_code(), StatusCode::BAD_DECODING_ERROR);
    }
}
