//! Lifecycle event bus.
//!
//! Broadcast channel (tokio): every subscriber receives every event.
//! The app provider publishes through `LifecycleNotifier`; the host
//! subscribes to react to catalog changes.

use log::debug;
use tokio::sync::broadcast::{self, Receiver, Sender};
use workspace_apps::{AppsError, LifecycleEvent, LifecycleNotifier};

/// Broadcast channel capacity.
/// Lagging receivers will skip old events (we only care about latest).
pub const CHANNEL_CAPACITY: usize = 64;

pub struct LifecycleBus {
    tx: Sender<LifecycleEvent>,
}

impl LifecycleBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns a new receiver that will receive all future events.
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleNotifier for LifecycleBus {
    /// Non-blocking. With no receivers the event is dropped (expected during startup).
    fn notify(&self, event: LifecycleEvent) -> Result<(), AppsError> {
        if self.tx.send(event).is_err() {
            debug!("No lifecycle subscribers for {}", event.name());
        }
        Ok(())
    }
}

/// Drain all pending events, returning how many were pending.
/// Handles RecvError::Lagged by continuing to drain.
pub fn drain(rx: &mut Receiver<LifecycleEvent>) -> usize {
    let mut count = 0;

    loop {
        match rx.try_recv() {
            Ok(_) => count += 1,
            Err(broadcast::error::TryRecvError::Empty) => break,
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => count += skipped as usize,
            Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }

    count
}
