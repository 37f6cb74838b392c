use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use pytoolbox::relay::{CommandEvent, Relay};

/// Records every relay event for later assertions.
///
/// Subscribes to all three event kinds on construction; drop the relay (the
/// last `Arc` clone) before calling [`finish`](Self::finish) so the
/// collection task can terminate.
pub struct EventRecorder {
    events: Arc<Mutex<Vec<CommandEvent>>>,
    handle: JoinHandle<()>,
}

impl EventRecorder {
    pub fn attach(relay: &Relay) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut rx = relay.subscribe_all();

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                sink.lock().unwrap().push(event);
            }
        });

        Self { events, handle }
    }

    /// Snapshot of the events collected so far.
    pub fn snapshot(&self) -> Vec<CommandEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Wait for the relay to close and return all recorded events.
    pub async fn finish(self) -> Vec<CommandEvent> {
        self.handle.await.expect("recorder task panicked");
        Arc::try_unwrap(self.events)
            .map(|m| m.into_inner().unwrap())
            .unwrap_or_default()
    }
}
