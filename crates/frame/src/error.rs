//! Error types for frame and identity parsing

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid MAC address string: {0}")]
    InvalidMac(String),

    #[error("frame too long: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("empty frame")]
    Empty,
}
