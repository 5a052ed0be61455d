// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared fixtures and builders for the integration tests.
//!
//! ## Module Structure
//!
//! - `fixtures`: Pre-built values, node ids, and message contexts
//! - `builders`: Builder patterns for constructing test objects

pub mod builders;
pub mod fixtures;

// Re-exports for convenience
pub use builders::*;
pub use fixtures::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test module.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,uawire=debug")),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}
