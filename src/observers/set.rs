//! # Non-blocking fan-out of events to observers.
//!
//! ```text
//! Bus ──► listen() ──► emit(event)
//!                         ├──► [queue 1] ──► worker 1 ──► observer1.on_event()
//!                         │    (bounded)         └──────► panic → ObserverPanicked
//!                         └──► [queue N] ──► worker N ──► observerN.on_event()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`).
//! - **Overflow**: event dropped for that observer only, `ObserverOverflow` published.
//! - **Per-observer FIFO**, no ordering across observers.
//! - Worker tasks use `catch_unwind`; a panicking observer keeps receiving events.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::Observe;
use crate::events::{Bus, Event};

struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event observers.
///
/// Must be created inside a Tokio runtime: one worker task is spawned per observer.
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl ObserverSet {
    /// Creates the set and spawns one worker per observer.
    ///
    /// Overflow and panic reports are published to `bus`.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for observer in observers {
            let name = observer.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(observer.queue_capacity().max(1));
            let reports = bus.clone();

            workers.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = observer.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        reports.publish(Event::observer_panicked(observer.name(), info));
                    }
                }
            }));
            channels.push(ObserverChannel { name, sender: tx });
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits a copy of `event` to every observer.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a shared event to every observer without cloning it.
    ///
    /// Overflow reports are not themselves re-reported on overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow = event.is_observer_overflow();

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus
                    .publish(Event::observer_overflow(channel.name, reason));
            }
        }
    }

    /// Forwards every event published on `bus` to the observers until `token`
    /// is cancelled or the bus closes.
    pub fn listen(self: &Arc<Self>, bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let set = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "observer listener lagged behind the bus");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
