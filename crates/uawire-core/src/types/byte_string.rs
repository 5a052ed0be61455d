// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Opaque byte sequences with a base64 text form.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::EncodingResult;

/// An opaque byte sequence.
///
/// The JSON wire form is standard base64; the binary wire form is a
/// length-prefixed run of raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    /// Creates a byte string from raw bytes.
    #[inline]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ByteString(bytes.into())
    }

    /// Returns the raw bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the byte string and returns the raw bytes.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Returns the number of bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the base64 text form.
    pub fn from_base64(text: &str) -> EncodingResult<Self> {
        Ok(ByteString(BASE64.decode(text)?))
    }

    /// Encodes the base64 text form.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl From<Vec<u8>> for ByteString {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        ByteString(bytes)
    }
}

impl From<&[u8]> for ByteString {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        ByteString(bytes.to_vec())
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_string_base64_round_trip() {
        let bytes = ByteString::new(vec![1u8, 2, 3, 4]);
        assert_eq!(bytes.to_base64(), "AQIDBA==");
        assert_eq!(ByteString::from_base64("AQIDBA==").unwrap(), bytes);
    }

    #[test]
    fn test_byte_string_invalid_base64() {
        assert!(ByteString::from_base64("!!!").is_err());
    }
}
