//! Frame and identity types for the USB NCM network bridge
//!
//! This crate holds the pure, I/O-free building blocks shared by the bridge
//! core and the daemon: hardware-address derivation for the USB network
//! gadget, owned frame buffers for the transmit/receive relay, and the fixed
//! addressing configuration handed to the lease service.

pub mod error;
pub mod identity;
pub mod lease;
pub mod packet;

pub use error::FrameError;
pub use identity::{MacAddress, NetworkIdentity};
pub use lease::LeaseConfig;
pub use packet::{MAX_FRAME_LEN, RxFrame, TxFrame};
