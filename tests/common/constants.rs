//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (credentials, ids, etc.), update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Client allowed to upload to smuggler
pub const TEST_USER: &str = "uploader";

/// Password of the upload client
pub const TEST_PASS: &str = "uploadpass123";

/// Account smuggler uses against the fake catalog
pub const CATALOG_USER: &str = "smuggler";

/// Password of the catalog account
pub const CATALOG_PASS: &str = "catalogpass123";

// ============================================================================
// Test Ids
// ============================================================================

/// HoldingGroup id used by most tests
pub const HOLDING_GROUP_ID: &str = "3b0d7f7c-9c2e-4b8a-a7d1-2f6f2b6c1e01";

/// Holding id used by most tests
pub const HOLDING_ID: &str = "8e5a4c1d-6f3b-4d2e-9a8c-7b1e0f2d3c02";

/// A second Holding in the same group
pub const HOLDING_2_ID: &str = "c47f2e9a-1b5d-4c3e-8f6a-0d9e8c7b6a03";

/// Well-known "digital" Format id
pub const DEFAULT_FORMAT_ID: &str = "00000000-0000-4000-8000-000000000001";

/// Well-known "default" Stack id
pub const DEFAULT_STACK_ID: &str = "00000000-0000-4000-8000-000000000002";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between server readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout for requests made by the test client and by smuggler (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upload limit configured on the test server
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;
