//! Relay metrics for the USB network bridge
//!
//! Every drop in the bridge is countable and none of them is fatal: a full
//! queue, a transport that stays busy past its readiness window, a transmit
//! while the link is down, or an IP-stack ingest failure all land in one of
//! these counters instead of raising into a callback context.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by the relay, its workers, and the link
/// state machine. Cheap to update from any context; reads are snapshots.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Frames accepted into the transmit queue.
    tx_enqueued: AtomicU64,
    /// Frames handed to the transport successfully.
    tx_sent: AtomicU64,
    /// Transmits rejected because the link was down.
    tx_dropped_link_down: AtomicU64,
    /// Transmits dropped because the transmit queue was full.
    tx_dropped_queue_full: AtomicU64,
    /// Frames dropped after the transport stayed busy or refused the send.
    tx_dropped_transport: AtomicU64,
    /// Frames accepted into the receive queue.
    rx_enqueued: AtomicU64,
    /// Frames delivered into the IP stack.
    rx_delivered: AtomicU64,
    /// Receive frames dropped because the receive queue was full.
    rx_dropped_queue_full: AtomicU64,
    /// Receive frames the IP stack refused to ingest.
    rx_dropped_ingest: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tx_enqueued(&self) {
        self.tx_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tx_sent(&self) {
        self.tx_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tx_dropped_link_down(&self) {
        self.tx_dropped_link_down.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tx_dropped_queue_full(&self) {
        self.tx_dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tx_dropped_transport(&self) {
        self.tx_dropped_transport.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rx_enqueued(&self) {
        self.rx_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rx_delivered(&self) {
        self.rx_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rx_dropped_queue_full(&self) {
        self.rx_dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rx_dropped_ingest(&self) {
        self.rx_dropped_ingest.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tx_enqueued: self.tx_enqueued.load(Ordering::Relaxed),
            tx_sent: self.tx_sent.load(Ordering::Relaxed),
            tx_dropped_link_down: self.tx_dropped_link_down.load(Ordering::Relaxed),
            tx_dropped_queue_full: self.tx_dropped_queue_full.load(Ordering::Relaxed),
            tx_dropped_transport: self.tx_dropped_transport.load(Ordering::Relaxed),
            rx_enqueued: self.rx_enqueued.load(Ordering::Relaxed),
            rx_delivered: self.rx_delivered.load(Ordering::Relaxed),
            rx_dropped_queue_full: self.rx_dropped_queue_full.load(Ordering::Relaxed),
            rx_dropped_ingest: self.rx_dropped_ingest.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of the counters, suitable for logging or status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub tx_enqueued: u64,
    pub tx_sent: u64,
    pub tx_dropped_link_down: u64,
    pub tx_dropped_queue_full: u64,
    pub tx_dropped_transport: u64,
    pub rx_enqueued: u64,
    pub rx_delivered: u64,
    pub rx_dropped_queue_full: u64,
    pub rx_dropped_ingest: u64,
}

impl MetricsSnapshot {
    /// All transmit-side drops combined.
    pub fn tx_dropped(&self) -> u64 {
        self.tx_dropped_link_down + self.tx_dropped_queue_full + self.tx_dropped_transport
    }

    /// All receive-side drops combined.
    pub fn rx_dropped(&self) -> u64 {
        self.rx_dropped_queue_full + self.rx_dropped_ingest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let snap = BridgeMetrics::new().snapshot();
        assert_eq!(snap, MetricsSnapshot::default());
        assert_eq!(snap.tx_dropped(), 0);
        assert_eq!(snap.rx_dropped(), 0);
    }

    #[test]
    fn drops_aggregate_per_direction() {
        let metrics = BridgeMetrics::new();
        metrics.record_tx_dropped_link_down();
        metrics.record_tx_dropped_queue_full();
        metrics.record_tx_dropped_transport();
        metrics.record_rx_dropped_queue_full();
        metrics.record_rx_dropped_ingest();

        let snap = metrics.snapshot();
        assert_eq!(snap.tx_dropped(), 3);
        assert_eq!(snap.rx_dropped(), 2);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        use std::sync::Arc;

        let metrics = Arc::new(BridgeMetrics::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let m = metrics.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_rx_enqueued();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().rx_enqueued, 4000);
    }
}
