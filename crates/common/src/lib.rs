//! Common utilities for usb-ncm-bridge
//!
//! This crate provides the plumbing shared between the bridge core and the
//! daemon: error handling, tracing setup, relay metrics, and test helpers.

pub mod error;
pub mod logging;
pub mod metrics;
pub mod test_utils;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use metrics::{BridgeMetrics, MetricsSnapshot};
