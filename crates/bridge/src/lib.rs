//! Link bridge between a USB network transport and the host IP stack
//!
//! The gadget side of a USB NCM adapter: the connected host sees a standard
//! wired network interface, and this crate relays Ethernet frames between
//! the USB transport and the IP stack while tracking the link's lifecycle.
//!
//! # Architecture
//!
//! ```text
//! transport callbacks            workers                collaborators
//!
//! on_frame_received ──copy──> [rx queue] ──rx worker──> Netif::ingest
//! on_link_up/down ───signal─> [control ] ──control────> AddressLifecycle,
//!                                          worker       LinkEventBus
//! IP stack transmit ─check──> [tx queue] ──tx worker──> UsbTransport::transmit
//!                    state
//! ```
//!
//! Callback contexts never block and never panic: every entry point the
//! transport can fire into is a non-blocking queue push, and every overflow
//! is a counted drop. Dedicated workers own the blocking-adjacent work
//! (readiness polling, ingest calls, lifecycle side effects).

pub mod bridge;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod link;
pub mod netif;
pub mod relay;
pub mod transport;

pub use crate::bridge::{Bridge, BridgeConfig};
pub use error::{BridgeError, TxRejected};
pub use events::{LinkEvent, LinkEventBus};
pub use lifecycle::AddressLifecycle;
pub use link::{LinkMonitor, LinkState};
pub use netif::{LeaseServer, Netif, NetifError};
pub use relay::FrameRelay;
pub use transport::UsbTransport;
