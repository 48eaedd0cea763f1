//! Link state machine
//!
//! Two states, no error state: transport-level trouble is surfaced to the
//! bridge only as Down. Transitions are driven by mount/unmount and
//! interface-activation signals that arrive in a callback context, so the
//! callback side only pushes a signal into a small bounded channel; a
//! control worker applies the transition and runs the side effects
//! (interface start/stop, lease service, event publication).
//!
//! Transitions are idempotent. The underlying transport may fire
//! mount/unmount more than once per physical event; re-entering the current
//! state is a no-op, not an error.

use crate::events::{LinkEvent, LinkEventBus};
use crate::lifecycle::AddressLifecycle;
use async_channel::Receiver;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, error, info};

/// Whether the USB-presented network interface is currently usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Down = 0,
    Up = 1,
}

/// Mount/unmount-style signal from the transport callback context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkSignal {
    Up,
    Down,
}

/// Atomically readable link state, shared by every context that needs it:
/// the transmit path checks it, the control worker writes it.
///
/// Only the control worker transitions the state; relay code never sets it.
#[derive(Debug)]
pub struct LinkMonitor {
    state: AtomicU8,
}

impl LinkMonitor {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LinkState::Down as u8),
        }
    }

    pub fn state(&self) -> LinkState {
        if self.state.load(Ordering::Acquire) == LinkState::Up as u8 {
            LinkState::Up
        } else {
            LinkState::Down
        }
    }

    pub fn is_up(&self) -> bool {
        self.state() == LinkState::Up
    }

    pub(crate) fn set(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Control worker: drains link signals and drives the state machine.
///
/// On `Down -> Up`: activate the address lifecycle (interface start, fixed
/// addressing, lease service), then publish Up. On `Up -> Down`: mark the
/// state down first so the transmit path starts rejecting, deactivate, then
/// publish Down. Activation failure leaves the state Down; the transport
/// will re-signal on the next mount.
pub(crate) async fn run_control_worker(
    signals: Receiver<LinkSignal>,
    monitor: Arc<LinkMonitor>,
    lifecycle: Arc<AddressLifecycle>,
    events: LinkEventBus,
) {
    while let Ok(signal) = signals.recv().await {
        match signal {
            LinkSignal::Up => {
                if monitor.is_up() {
                    debug!("duplicate link-up signal ignored");
                    continue;
                }
                match lifecycle.activate() {
                    Ok(()) => {
                        monitor.set(LinkState::Up);
                        info!("link is up");
                        events.publish(LinkEvent::Up);
                    }
                    Err(e) => {
                        // Fatal to this activation attempt only; state
                        // stays Down and the next mount retries.
                        error!("link activation failed: {e}");
                    }
                }
            }
            LinkSignal::Down => {
                if !monitor.is_up() {
                    debug!("duplicate link-down signal ignored");
                    continue;
                }
                monitor.set(LinkState::Down);
                lifecycle.deactivate();
                info!("link is down");
                events.publish(LinkEvent::Down);
            }
        }
    }
    // Channel closed: bridge is shutting down. Tear down if still up.
    if monitor.is_up() {
        monitor.set(LinkState::Down);
        lifecycle.deactivate();
        events.publish(LinkEvent::Down);
    }
    debug!("control worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_starts_down() {
        let monitor = LinkMonitor::new();
        assert_eq!(monitor.state(), LinkState::Down);
        assert!(!monitor.is_up());
    }

    #[test]
    fn monitor_set_is_visible() {
        let monitor = LinkMonitor::new();
        monitor.set(LinkState::Up);
        assert!(monitor.is_up());
        monitor.set(LinkState::Down);
        assert!(!monitor.is_up());
    }
}
