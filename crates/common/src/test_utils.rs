//! Test utilities for usb-ncm-bridge
//!
//! Helpers shared by the unit and integration suites across crates.

use frame::{MacAddress, NetworkIdentity};
use std::future::Future;
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed seed used by tests that need a deterministic identity.
pub const TEST_SEED: MacAddress = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// Identity derived from [`TEST_SEED`] with a test hostname.
pub fn test_identity() -> NetworkIdentity {
    NetworkIdentity::derive(TEST_SEED, Some("test-gadget"))
}

/// A frame payload of `len` bytes with a recognizable pattern.
pub fn test_frame_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xFF) as u8).collect()
}

/// Timeout wrapper for async tests
///
/// Wraps an async operation with a timeout to prevent tests from hanging.
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { duration })
}

/// Error returned when a test times out
#[derive(Debug)]
pub struct TimeoutError {
    /// The timeout duration that was exceeded
    pub duration: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Test timed out after {:?}", self.duration)
    }
}

impl std::error::Error for TimeoutError {}
