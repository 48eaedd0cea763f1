//! Address lifecycle controller
//!
//! Owns the "interface is configured and leasing" side effects of the link
//! coming up: bring the IP interface up, apply the fixed addressing, start
//! the lease service for the peer. Teardown runs in the opposite order with
//! the lease service first, so no lease is granted on an interface that is
//! about to go down.

use crate::netif::{LeaseServer, Netif, NetifError};
use frame::{LeaseConfig, NetworkIdentity};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub struct AddressLifecycle {
    netif: Arc<dyn Netif>,
    lease_server: Arc<dyn LeaseServer>,
    identity: NetworkIdentity,
    lease: LeaseConfig,
    active: AtomicBool,
}

impl AddressLifecycle {
    pub fn new(
        netif: Arc<dyn Netif>,
        lease_server: Arc<dyn LeaseServer>,
        identity: NetworkIdentity,
    ) -> Self {
        Self {
            netif,
            lease_server,
            identity,
            lease: LeaseConfig::fixed(),
            active: AtomicBool::new(false),
        }
    }

    /// Bring the interface up: start it in the IP stack, assign the fixed
    /// prefix and hardware identity, then start the lease service.
    ///
    /// Partial failure unwinds whatever was already started and returns the
    /// error; this is the one failure class that is fatal to the activation
    /// attempt rather than a counted drop. Idempotent: activating an active
    /// controller is a no-op.
    pub fn activate(&self) -> Result<(), NetifError> {
        if self.active.load(Ordering::Acquire) {
            debug!("address lifecycle already active");
            return Ok(());
        }

        self.netif.start()?;

        if let Err(e) = self.netif.assign(&self.lease, &self.identity) {
            warn!("address assignment failed, stopping interface: {e}");
            self.netif.stop();
            return Err(e);
        }

        if let Err(e) = self.lease_server.start(&self.lease) {
            warn!("lease service start failed, stopping interface: {e}");
            self.netif.stop();
            return Err(e);
        }

        self.active.store(true, Ordering::Release);
        info!(
            mac = %self.identity.mac,
            addr = %self.lease.interface_addr,
            "interface configured, lease service started"
        );
        Ok(())
    }

    /// Tear the interface down: lease service first, then the interface.
    /// Idempotent: deactivating an inactive controller is a no-op.
    pub fn deactivate(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            debug!("address lifecycle already inactive");
            return;
        }
        self.lease_server.stop();
        self.netif.stop();
        info!("lease service stopped, interface down");
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn identity(&self) -> &NetworkIdentity {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::RxFrame;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct RecordingNetif {
        starts: AtomicUsize,
        stops: AtomicUsize,
        assigns: AtomicUsize,
        fail_assign: AtomicBool,
    }

    impl Netif for RecordingNetif {
        fn start(&self) -> Result<(), NetifError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn assign(&self, _: &LeaseConfig, _: &NetworkIdentity) -> Result<(), NetifError> {
            self.assigns.fetch_add(1, Ordering::SeqCst);
            if self.fail_assign.load(Ordering::SeqCst) {
                Err(NetifError::Assign("injected".into()))
            } else {
                Ok(())
            }
        }

        fn ingest(&self, _: RxFrame) -> Result<(), NetifError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLease {
        starts: AtomicUsize,
        stops: AtomicUsize,
        fail_start: AtomicBool,
    }

    impl LeaseServer for RecordingLease {
        fn start(&self, _: &LeaseConfig) -> Result<(), NetifError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start.load(Ordering::SeqCst) {
                Err(NetifError::Lease("injected".into()))
            } else {
                Ok(())
            }
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn lifecycle_with(
        netif: Arc<RecordingNetif>,
        lease: Arc<RecordingLease>,
    ) -> AddressLifecycle {
        AddressLifecycle::new(netif, lease, common::test_utils::test_identity())
    }

    #[test]
    fn activate_then_deactivate_runs_in_order() {
        let netif = Arc::new(RecordingNetif::default());
        let lease = Arc::new(RecordingLease::default());
        let lc = lifecycle_with(netif.clone(), lease.clone());

        lc.activate().unwrap();
        assert!(lc.is_active());
        assert_eq!(netif.starts.load(Ordering::SeqCst), 1);
        assert_eq!(netif.assigns.load(Ordering::SeqCst), 1);
        assert_eq!(lease.starts.load(Ordering::SeqCst), 1);

        lc.deactivate();
        assert!(!lc.is_active());
        assert_eq!(lease.stops.load(Ordering::SeqCst), 1);
        assert_eq!(netif.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn activate_is_idempotent() {
        let netif = Arc::new(RecordingNetif::default());
        let lease = Arc::new(RecordingLease::default());
        let lc = lifecycle_with(netif.clone(), lease.clone());

        lc.activate().unwrap();
        lc.activate().unwrap();
        assert_eq!(netif.starts.load(Ordering::SeqCst), 1);
        assert_eq!(lease.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deactivate_on_inactive_is_a_noop() {
        let netif = Arc::new(RecordingNetif::default());
        let lease = Arc::new(RecordingLease::default());
        let lc = lifecycle_with(netif.clone(), lease.clone());

        lc.deactivate();
        assert_eq!(netif.stops.load(Ordering::SeqCst), 0);
        assert_eq!(lease.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn assign_failure_unwinds_interface_start() {
        let netif = Arc::new(RecordingNetif::default());
        netif.fail_assign.store(true, Ordering::SeqCst);
        let lease = Arc::new(RecordingLease::default());
        let lc = lifecycle_with(netif.clone(), lease.clone());

        assert!(lc.activate().is_err());
        assert!(!lc.is_active());
        assert_eq!(netif.stops.load(Ordering::SeqCst), 1);
        assert_eq!(lease.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lease_failure_unwinds_interface_start() {
        let netif = Arc::new(RecordingNetif::default());
        let lease = Arc::new(RecordingLease::default());
        lease.fail_start.store(true, Ordering::SeqCst);
        let lc = lifecycle_with(netif.clone(), lease.clone());

        assert!(lc.activate().is_err());
        assert!(!lc.is_active());
        assert_eq!(netif.stops.load(Ordering::SeqCst), 1);
    }
}
