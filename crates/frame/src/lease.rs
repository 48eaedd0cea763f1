//! Fixed addressing for the USB-presented network
//!
//! The prefix handed to the peer is the closest thing the bridge has to a
//! wire contract: a connected host must be able to run unmodified DHCP
//! against it. The parameters are compile-time constants, not runtime
//! configuration.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Interface address on the gadget side; also the gateway and DNS hint
/// advertised to the peer.
pub const INTERFACE_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 7, 1);
/// Netmask for the link-local prefix.
pub const NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);
/// Lease duration granted to the peer.
pub const LEASE_DURATION: Duration = Duration::from_secs(60 * 60);

/// Static addressing applied to the interface while the link is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Address assigned to the gadget-side interface.
    pub interface_addr: Ipv4Addr,
    /// Gateway advertised to the peer (same box, same address).
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
    /// DNS server hint option handed out with each lease.
    pub dns: Ipv4Addr,
    pub lease_duration: Duration,
}

impl LeaseConfig {
    /// The canonical fixed configuration for the bridge.
    pub fn fixed() -> Self {
        Self {
            interface_addr: INTERFACE_ADDR,
            gateway: INTERFACE_ADDR,
            netmask: NETMASK,
            dns: INTERFACE_ADDR,
            lease_duration: LEASE_DURATION,
        }
    }

    /// First address of the peer pool (gadget address + 1).
    pub fn pool_start(&self) -> Ipv4Addr {
        let mut o = self.interface_addr.octets();
        o[3] = o[3].wrapping_add(1);
        Ipv4Addr::from(o)
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self::fixed()
    }
}
