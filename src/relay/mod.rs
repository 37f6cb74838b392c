// src/relay/mod.rs

//! The command relay: process spawning + structured log streaming.
//!
//! Commands are executed with shell interpretation and their stdout/stderr
//! multiplexed into line-oriented [`CommandEvent`]s tagged with a generated
//! [`CommandId`]. Events fan out to **at most one subscriber per event
//! kind**; registering a new subscriber for a kind replaces the previous
//! one, and emission with no subscriber is a no-op.
//!
//! - [`events`] defines the event and output types.
//! - [`runner`] spawns the processes and produces the events.

pub mod events;
pub mod runner;

pub use events::{CommandEvent, CommandId, CommandOutput, EventKind, LogLevel};
pub use runner::{capture, run};

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::trace;

/// Fan-out point for command events.
///
/// Holds one optional sender per event kind. Cheap to share behind an `Arc`;
/// emission never blocks (unbounded channels) so the runner's read loops are
/// not throttled by slow subscribers.
#[derive(Debug, Default)]
pub struct Relay {
    started: Mutex<Option<mpsc::UnboundedSender<CommandEvent>>>,
    log: Mutex<Option<mpsc::UnboundedSender<CommandEvent>>>,
    finished: Mutex<Option<mpsc::UnboundedSender<CommandEvent>>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a single event kind, replacing any previous subscriber.
    pub fn subscribe(&self, kind: EventKind) -> mpsc::UnboundedReceiver<CommandEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.slot(kind).lock().expect("relay slot poisoned") = Some(tx);
        rx
    }

    /// Subscribe one channel to all three event kinds at once.
    ///
    /// Convenience for consumers like the log store that want the full
    /// start/log/end lifecycle in order on a single receiver.
    pub fn subscribe_all(&self) -> mpsc::UnboundedReceiver<CommandEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for kind in [EventKind::Started, EventKind::Log, EventKind::Finished] {
            *self.slot(kind).lock().expect("relay slot poisoned") = Some(tx.clone());
        }
        rx
    }

    /// Deliver an event to the subscriber registered for its kind, if any.
    ///
    /// A subscriber whose receiver has been dropped is unregistered on the
    /// first failed send.
    pub(crate) fn emit(&self, event: CommandEvent) {
        let slot = self.slot(event.kind());
        let mut guard = slot.lock().expect("relay slot poisoned");
        if let Some(tx) = guard.as_ref() {
            if tx.send(event).is_err() {
                trace!("relay subscriber gone; unregistering");
                *guard = None;
            }
        }
    }

    fn slot(&self, kind: EventKind) -> &Mutex<Option<mpsc::UnboundedSender<CommandEvent>>> {
        match kind {
            EventKind::Started => &self.started,
            EventKind::Log => &self.log,
            EventKind::Finished => &self.finished,
        }
    }
}
