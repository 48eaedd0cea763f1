//! The bridge context object
//!
//! One `Bridge` owns everything for one USB network interface: the relay
//! queues, the link state, the event bus, the metrics, and the worker
//! tasks. There are no global handles; construct it once at startup and
//! hand references to the transport glue and the IP stack glue. Multiple
//! bridges can coexist, which is what makes the whole thing testable.

use crate::error::TxRejected;
use crate::events::{LinkEvent, LinkEventBus};
use crate::lifecycle::AddressLifecycle;
use crate::link::{LinkMonitor, LinkSignal, LinkState, run_control_worker};
use crate::netif::{LeaseServer, Netif};
use crate::relay::{FrameRelay, TxPolicy, run_rx_worker, run_tx_worker};
use crate::transport::UsbTransport;
use async_channel::{Sender, bounded};
use common::{BridgeMetrics, MetricsSnapshot};
use frame::{NetworkIdentity, TxFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Tunables for one bridge instance. Network addressing is deliberately
/// absent: it is fixed at compile time (see `frame::lease`).
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Transmit queue capacity (frames).
    pub tx_queue_capacity: usize,
    /// Receive queue capacity (frames).
    pub rx_queue_capacity: usize,
    /// Link signal queue capacity. Small; duplicate signals coalesce.
    pub control_queue_capacity: usize,
    /// Event bus capacity for slow subscribers.
    pub event_capacity: usize,
    /// Transmit readiness re-check interval.
    pub readiness_poll: Duration,
    /// Upper bound on the per-frame transmit readiness wait.
    pub readiness_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tx_queue_capacity: 8,
            rx_queue_capacity: 8,
            control_queue_capacity: 4,
            event_capacity: 16,
            readiness_poll: Duration::from_millis(2),
            readiness_timeout: Duration::from_millis(100),
        }
    }
}

pub struct Bridge {
    relay: FrameRelay,
    monitor: Arc<LinkMonitor>,
    lifecycle: Arc<AddressLifecycle>,
    events: LinkEventBus,
    metrics: Arc<BridgeMetrics>,
    signals: Sender<LinkSignal>,
    workers: Vec<JoinHandle<()>>,
}

impl Bridge {
    /// Construct the bridge and spawn its workers. Requires a tokio
    /// runtime. The link starts Down; nothing happens until the transport
    /// signals up.
    pub fn start(
        config: BridgeConfig,
        identity: NetworkIdentity,
        transport: Arc<dyn UsbTransport>,
        netif: Arc<dyn Netif>,
        lease_server: Arc<dyn LeaseServer>,
    ) -> Self {
        let monitor = Arc::new(LinkMonitor::new());
        let metrics = Arc::new(BridgeMetrics::new());
        let events = LinkEventBus::new(config.event_capacity);
        let lifecycle = Arc::new(AddressLifecycle::new(netif.clone(), lease_server, identity));

        let (relay, consumers) = FrameRelay::new(
            config.tx_queue_capacity,
            config.rx_queue_capacity,
            monitor.clone(),
            metrics.clone(),
        );
        let (signal_tx, signal_rx) = bounded(config.control_queue_capacity);

        let policy = TxPolicy {
            readiness_poll: config.readiness_poll,
            readiness_timeout: config.readiness_timeout,
        };

        let workers = vec![
            tokio::spawn(run_tx_worker(
                consumers.tx_queue,
                transport,
                monitor.clone(),
                metrics.clone(),
                policy,
            )),
            tokio::spawn(run_rx_worker(consumers.rx_queue, netif, metrics.clone())),
            tokio::spawn(run_control_worker(
                signal_rx,
                monitor.clone(),
                lifecycle.clone(),
                events.clone(),
            )),
        ];

        info!(
            mac = %lifecycle.identity().mac,
            "bridge started"
        );

        Self {
            relay,
            monitor,
            lifecycle,
            events,
            metrics,
            signals: signal_tx,
            workers,
        }
    }

    // --- transport-facing entry points (callback context, non-blocking) ---

    /// Transport signal: device attached / interface active.
    pub fn on_link_up(&self) {
        self.push_signal(LinkSignal::Up);
    }

    /// Transport signal: device detached / interface inactive.
    pub fn on_link_down(&self) {
        self.push_signal(LinkSignal::Down);
    }

    /// Transport receive callback. Copies the frame and returns promptly;
    /// the return value tells the transport its buffer may be reused (the
    /// transport is never asked to retry).
    pub fn on_frame_received(&self, data: &[u8]) -> bool {
        self.relay.push_rx(data)
    }

    fn push_signal(&self, signal: LinkSignal) {
        // A full control queue means a signal storm; transitions are
        // idempotent and level-triggered, so coalescing is safe.
        if self.signals.try_send(signal).is_err() {
            trace!(?signal, "control queue full or closed, coalescing signal");
        }
    }

    // --- IP-stack-facing entry point ---

    /// Queue a frame for transmission. Non-blocking; see
    /// [`FrameRelay::enqueue_tx`] for the rejection cases.
    pub fn transmit(&self, frame: TxFrame) -> Result<(), TxRejected> {
        self.relay.enqueue_tx(frame)
    }

    // --- application-facing surface ---

    /// Current link state, readable from any context.
    pub fn link_state(&self) -> LinkState {
        self.monitor.state()
    }

    /// Subscribe to Up/Down events.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    /// Whether the address lifecycle (interface + lease service) is active.
    pub fn is_lease_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Drain-then-stop shutdown: close the queues so the workers finish
    /// whatever is already queued, then wait for them to exit. The control
    /// worker tears the link down on its way out, so no lease service or
    /// interface outlives the bridge.
    pub async fn shutdown(mut self) {
        debug!("bridge shutting down");
        self.relay.close();
        self.signals.close();
        for worker in self.workers.drain(..) {
            // Workers never panic in normal operation; a join error here
            // means the runtime is tearing down around us.
            let _ = worker.await;
        }
        info!("bridge stopped");
    }
}
