//! IP-stack-side traits the bridge drives
//!
//! The TCP/IP stack and the lease (DHCP) service are external
//! collaborators. The bridge starts and stops them from the link state
//! machine and feeds received frames into `ingest`; their internals are out
//! of scope.

use frame::{LeaseConfig, NetworkIdentity, RxFrame};
use thiserror::Error;

/// Failures surfaced by the IP-stack collaborators.
///
/// The setup variants (`Start`, `Assign`, `Lease`) are fatal to the current
/// activation attempt and abort it; `Ingest` is a per-frame drop.
#[derive(Debug, Error)]
pub enum NetifError {
    #[error("interface start failed: {0}")]
    Start(String),

    #[error("address assignment failed: {0}")]
    Assign(String),

    #[error("lease service start failed: {0}")]
    Lease(String),

    #[error("frame ingest rejected: {0}")]
    Ingest(String),
}

/// Driver adapter the IP stack expects from any network interface.
pub trait Netif: Send + Sync {
    /// Bring the interface up in the IP stack.
    fn start(&self) -> Result<(), NetifError>;

    /// Take the interface down. Must be idempotent.
    fn stop(&self);

    /// Apply the fixed addressing and the gadget's hardware identity to the
    /// interface. Called between `start` and the lease service start.
    fn assign(&self, lease: &LeaseConfig, identity: &NetworkIdentity) -> Result<(), NetifError>;

    /// Feed a received frame into the IP stack. Consumes the frame; on
    /// error the buffer has already been released.
    fn ingest(&self, frame: RxFrame) -> Result<(), NetifError>;
}

/// Lease-granting service scoped to the bridge interface.
pub trait LeaseServer: Send + Sync {
    /// Start granting leases for the given prefix. Must be idempotent.
    fn start(&self, lease: &LeaseConfig) -> Result<(), NetifError>;

    /// Stop granting leases. Must be idempotent.
    fn stop(&self);
}
