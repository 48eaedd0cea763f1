//! Bridge error types

use crate::netif::NetifError;
use thiserror::Error;

/// Why a transmit was not accepted.
///
/// None of these are fatal: every rejection is a counted drop and the
/// caller may simply try again with the next frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxRejected {
    /// The link is down; the frame was rejected without touching the queue.
    #[error("link is down")]
    LinkDown,

    /// The transmit queue is full; the incoming frame was dropped
    /// (drop-newest policy).
    #[error("transmit queue full")]
    QueueFull,

    /// The bridge has been shut down.
    #[error("bridge shut down")]
    Shutdown,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("setup failed: {0}")]
    Setup(#[from] NetifError),

    #[error("channel error: {0}")]
    Channel(String),
}
