// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builder patterns for constructing complex test objects with sensible defaults.
//!
//! ## Design Principles
//!
//! - Sensible defaults for common test scenarios
//! - Chainable methods for fluent API
//! - Clear separation between required and optional fields

use uawire_core::{
    status::StatusCode,
    types::{DataValue, DiagnosticInfo, UaDateTime},
    variant::Variant,
};

// =============================================================================
// DataValue Builder
// =============================================================================

/// Builder for constructing DataValue instances with sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct DataValueBuilder {
    value: Variant,
    status: StatusCode,
    source_timestamp: Option<UaDateTime>,
    source_picoseconds: u16,
    server_timestamp: Option<UaDateTime>,
    server_picoseconds: u16,
}

impl DataValueBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value.
    pub fn value(mut self, value: impl Into<Variant>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the status code.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set the source timestamp.
    pub fn source_timestamp(mut self, timestamp: UaDateTime) -> Self {
        self.source_timestamp = Some(timestamp);
        self
    }

    /// Set the source picoseconds.
    pub fn source_picoseconds(mut self, picoseconds: u16) -> Self {
        self.source_picoseconds = picoseconds;
        self
    }

    /// Set the server timestamp.
    pub fn server_timestamp(mut self, timestamp: UaDateTime) -> Self {
        self.server_timestamp = Some(timestamp);
        self
    }

    /// Set the server picoseconds.
    pub fn server_picoseconds(mut self, picoseconds: u16) -> Self {
        self.server_picoseconds = picoseconds;
        self
    }

    /// Build the data value.
    pub fn build(self) -> DataValue {
        DataValue {
            value: self.value,
            status: self.status,
            source_timestamp: self.source_timestamp,
            source_picoseconds: self.source_picoseconds,
            server_timestamp: self.server_timestamp,
            server_picoseconds: self.server_picoseconds,
        }
    }
}

// =============================================================================
// DiagnosticInfo Builder
// =============================================================================

/// Builder for constructing DiagnosticInfo chains.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticInfoBuilder {
    info: DiagnosticInfo,
}

impl DiagnosticInfoBuilder {
    /// Create a new builder with all fields absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbolic id string-table index.
    pub fn symbolic_id(mut self, index: i32) -> Self {
        self.info.symbolic_id = Some(index);
        self
    }

    /// Set the namespace URI string-table index.
    pub fn namespace_uri(mut self, index: i32) -> Self {
        self.info.namespace_uri = Some(index);
        self
    }

    /// Set the additional info text.
    pub fn additional_info(mut self, text: impl Into<String>) -> Self {
        self.info.additional_info = Some(text.into());
        self
    }

    /// Set the inner status code.
    pub fn inner_status_code(mut self, status: StatusCode) -> Self {
        self.info.inner_status_code = Some(status);
        self
    }

    /// Nest another diagnostic info inside this one.
    pub fn inner(mut self, inner: DiagnosticInfo) -> Self {
        self.info.inner_diagnostic_info = Some(Box::new(inner));
        self
    }

    /// Build the diagnostic info.
    pub fn build(self) -> DiagnosticInfo {
        self.info
    }
}
