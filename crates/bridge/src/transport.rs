//! Transport-side trait the bridge transmits through
//!
//! The USB protocol stack itself (enumeration, endpoint scheduling,
//! descriptors) lives behind this trait. The bridge only needs two
//! primitives from it; everything the transport fires back at the bridge
//! (received frames, link signals) goes through [`crate::Bridge`]'s
//! callback entry points instead.

use frame::TxFrame;

/// Outbound surface of the USB network transport.
///
/// Implementations must be cheap to call: `can_transmit` is polled from the
/// transmit worker's bounded readiness loop and must not block.
pub trait UsbTransport: Send + Sync {
    /// Whether the transport can currently accept a frame of `len` bytes.
    fn can_transmit(&self, len: usize) -> bool;

    /// Hand a frame to the transport. Returns `true` if the transport
    /// accepted it. The transport owns the frame after this call whether or
    /// not it was accepted; the relay keeps no reference either way.
    fn transmit(&self, frame: TxFrame) -> bool;
}
