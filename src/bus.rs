use crate::events::SessionEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}
