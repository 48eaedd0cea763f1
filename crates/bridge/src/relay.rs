//! Buffer relay: bounded frame queues between the transport and the IP stack
//!
//! Two independent directions with no shared mutable state beyond the
//! queues themselves. Each queue is a bounded single-producer/
//! single-consumer channel; the producer side never blocks.
//!
//! # Drop policy
//!
//! Both directions drop the **newest** frame when their queue is full: the
//! incoming frame is discarded and a counter incremented, frames already
//! queued are left alone. The transmit caller gets `TxRejected::QueueFull`;
//! the receive callback still reports success to the transport, which must
//! never be told to retry a receive.
//!
//! # Ownership
//!
//! Frames move: into the queue at enqueue, out of the queue into
//! `UsbTransport::transmit` / `Netif::ingest` in the workers. A dropped
//! frame is released by the drop itself. No path retains a reference after
//! handoff.

use crate::error::TxRejected;
use crate::link::LinkMonitor;
use crate::netif::Netif;
use crate::transport::UsbTransport;
use async_channel::{Receiver, Sender, TrySendError, bounded};
use common::BridgeMetrics;
use frame::{RxFrame, TxFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Producer-side handle for both relay directions.
///
/// `enqueue_tx` is called from the IP stack's context, `push_rx` from the
/// transport's receive callback context; neither ever blocks.
pub struct FrameRelay {
    tx_queue: Sender<TxFrame>,
    rx_queue: Sender<RxFrame>,
    link: Arc<LinkMonitor>,
    metrics: Arc<BridgeMetrics>,
}

/// Consumer ends of the relay queues, handed to the workers.
pub(crate) struct RelayConsumers {
    pub tx_queue: Receiver<TxFrame>,
    pub rx_queue: Receiver<RxFrame>,
}

/// Bounded readiness wait used by the transmit worker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TxPolicy {
    /// How often to re-check `can_transmit` while the transport is busy.
    pub readiness_poll: Duration,
    /// Hard upper bound on the readiness wait per frame.
    pub readiness_timeout: Duration,
}

impl FrameRelay {
    pub(crate) fn new(
        tx_capacity: usize,
        rx_capacity: usize,
        link: Arc<LinkMonitor>,
        metrics: Arc<BridgeMetrics>,
    ) -> (Self, RelayConsumers) {
        let (tx_s, tx_r) = bounded(tx_capacity);
        let (rx_s, rx_r) = bounded(rx_capacity);
        (
            Self {
                tx_queue: tx_s,
                rx_queue: rx_s,
                link,
                metrics,
            },
            RelayConsumers {
                tx_queue: tx_r,
                rx_queue: rx_r,
            },
        )
    }

    /// Queue a frame for transmission over the USB link.
    ///
    /// O(1) and non-blocking. A transmit while the link is down is rejected
    /// before the queue is touched; a full queue drops this frame
    /// (drop-newest) and counts it.
    pub fn enqueue_tx(&self, frame: TxFrame) -> Result<(), TxRejected> {
        if !self.link.is_up() {
            self.metrics.record_tx_dropped_link_down();
            return Err(TxRejected::LinkDown);
        }
        match self.tx_queue.try_send(frame) {
            Ok(()) => {
                self.metrics.record_tx_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.record_tx_dropped_queue_full();
                Err(TxRejected::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics.record_tx_dropped_queue_full();
                Err(TxRejected::Shutdown)
            }
        }
    }

    /// Accept a received frame from the transport callback context.
    ///
    /// Copies the transport-owned buffer into an owned frame and queues it.
    /// Always returns `true` to the transport — a full queue or an oversize
    /// frame is a counted drop, never a retry request — and completes in
    /// bounded time regardless of queue state.
    pub fn push_rx(&self, data: &[u8]) -> bool {
        let frame = match RxFrame::copy_from(data) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping unrelayable frame: {e}");
                self.metrics.record_rx_dropped_queue_full();
                return true;
            }
        };
        match self.rx_queue.try_send(frame) {
            Ok(()) => {
                self.metrics.record_rx_enqueued();
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                trace!("receive queue full, dropping frame");
                self.metrics.record_rx_dropped_queue_full();
            }
        }
        true
    }

    /// Close both queues. Workers drain what is already queued and then
    /// exit (drain-then-stop); later pushes are counted drops.
    pub(crate) fn close(&self) {
        self.tx_queue.close();
        self.rx_queue.close();
    }
}

/// Transmit worker: pumps queued frames into the transport.
///
/// Polls transport readiness with a bounded wait per frame; a transport
/// that stays busy past the window, or refuses the frame after claiming
/// readiness, costs that frame (counted), never the worker.
pub(crate) async fn run_tx_worker(
    queue: Receiver<TxFrame>,
    transport: Arc<dyn UsbTransport>,
    link: Arc<LinkMonitor>,
    metrics: Arc<BridgeMetrics>,
    policy: TxPolicy,
) {
    while let Ok(frame) = queue.recv().await {
        // Frames queued before a concurrent Up -> Down transition fail
        // safely here instead of reaching a dead transport.
        if !link.is_up() {
            metrics.record_tx_dropped_link_down();
            continue;
        }

        let deadline = Instant::now() + policy.readiness_timeout;
        let mut ready = transport.can_transmit(frame.len());
        while !ready && Instant::now() < deadline {
            tokio::time::sleep(policy.readiness_poll).await;
            ready = transport.can_transmit(frame.len());
        }

        if !ready {
            trace!("transport busy past readiness window, dropping frame");
            metrics.record_tx_dropped_transport();
            continue;
        }
        if transport.transmit(frame) {
            metrics.record_tx_sent();
        } else {
            metrics.record_tx_dropped_transport();
        }
    }
    debug!("tx worker stopped");
}

/// Receive worker: drains the receive queue into the IP stack.
///
/// Ingest failure is a counted drop; the frame buffer is released either
/// way because `ingest` consumes it.
pub(crate) async fn run_rx_worker(
    queue: Receiver<RxFrame>,
    netif: Arc<dyn Netif>,
    metrics: Arc<BridgeMetrics>,
) {
    while let Ok(frame) = queue.recv().await {
        match netif.ingest(frame) {
            Ok(()) => metrics.record_rx_delivered(),
            Err(e) => {
                trace!("IP stack refused frame: {e}");
                metrics.record_rx_dropped_ingest();
            }
        }
    }
    debug!("rx worker stopped");
}
