//! In-process collaborators for demo and smoke runs
//!
//! A real deployment glues the bridge to a USB gadget transport and the
//! host IP stack. The daemon's demo mode wires it to a loopback transport
//! that echoes every transmitted frame back as a received one, plus
//! logging stand-ins for the IP-stack collaborators, so the whole relay
//! path can be exercised without hardware.

use async_channel::{Receiver, Sender, bounded};
use bridge::{LeaseServer, Netif, NetifError, UsbTransport};
use bytes::Bytes;
use frame::{LeaseConfig, NetworkIdentity, RxFrame, TxFrame};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// Transport that hands every transmitted frame back to the daemon for
/// re-injection as a received frame.
pub struct LoopbackTransport {
    echo: Sender<Bytes>,
}

impl LoopbackTransport {
    /// Returns the transport and the echo stream of transmitted payloads.
    pub fn new(capacity: usize) -> (Self, Receiver<Bytes>) {
        let (echo, echo_rx) = bounded(capacity);
        (Self { echo }, echo_rx)
    }
}

impl UsbTransport for LoopbackTransport {
    fn can_transmit(&self, _len: usize) -> bool {
        !self.echo.is_full()
    }

    fn transmit(&self, frame: TxFrame) -> bool {
        self.echo.try_send(frame.into_payload()).is_ok()
    }
}

/// IP-stack stand-in that logs and counts what it is fed.
#[derive(Default)]
pub struct LogNetif {
    up: AtomicBool,
    ingested: AtomicU64,
}

impl LogNetif {
    pub fn ingested(&self) -> u64 {
        self.ingested.load(Ordering::Relaxed)
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }
}

impl Netif for LogNetif {
    fn start(&self) -> Result<(), NetifError> {
        self.up.store(true, Ordering::SeqCst);
        info!("netif: interface started");
        Ok(())
    }

    fn stop(&self) {
        self.up.store(false, Ordering::SeqCst);
        info!("netif: interface stopped");
    }

    fn assign(&self, lease: &LeaseConfig, identity: &NetworkIdentity) -> Result<(), NetifError> {
        info!(
            addr = %lease.interface_addr,
            netmask = %lease.netmask,
            mac = %identity.mac,
            "netif: addressing assigned"
        );
        Ok(())
    }

    fn ingest(&self, frame: RxFrame) -> Result<(), NetifError> {
        let count = self.ingested.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(len = frame.len(), count, "netif: frame ingested");
        Ok(())
    }
}

/// Lease service stand-in.
#[derive(Default)]
pub struct LogLeaseServer {
    active: AtomicBool,
}

impl LogLeaseServer {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl LeaseServer for LogLeaseServer {
    fn start(&self, lease: &LeaseConfig) -> Result<(), NetifError> {
        self.active.store(true, Ordering::SeqCst);
        info!(
            pool_start = %lease.pool_start(),
            dns = %lease.dns,
            lease_secs = lease.lease_duration.as_secs(),
            "lease service started"
        );
        Ok(())
    }

    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        info!("lease service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::test_frame_bytes;

    #[test]
    fn loopback_echoes_transmitted_frames() {
        let (transport, echo) = LoopbackTransport::new(4);

        let frame = TxFrame::new(test_frame_bytes(100).into()).unwrap();
        assert!(transport.can_transmit(frame.len()));
        assert!(transport.transmit(frame));

        let payload = echo.try_recv().unwrap();
        assert_eq!(payload.len(), 100);
    }

    #[test]
    fn loopback_backpressures_when_echo_is_full() {
        let (transport, _echo) = LoopbackTransport::new(1);

        let frame = TxFrame::new(test_frame_bytes(10).into()).unwrap();
        assert!(transport.transmit(frame));
        assert!(!transport.can_transmit(10));
    }

    #[test]
    fn stubs_track_their_lifecycle() {
        let netif = LogNetif::default();
        netif.start().unwrap();
        assert!(netif.is_up());
        netif.stop();
        assert!(!netif.is_up());

        let lease = LogLeaseServer::default();
        lease.start(&LeaseConfig::fixed()).unwrap();
        assert!(lease.is_active());
        lease.stop();
        assert!(!lease.is_active());
    }
}
