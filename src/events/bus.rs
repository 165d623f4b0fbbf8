//! Broadcast bus for library events

use tokio::sync::broadcast;

use super::types::LibraryEvent;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out of [`LibraryEvent`]s to any number of subscribers
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// simply dropped, and slow subscribers observe `Lagged`.
#[derive(Debug, Clone)]
pub struct LibraryEventBus {
    sender: broadcast::Sender<LibraryEvent>,
}

impl LibraryEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.sender.subscribe()
    }

    /// Publish `event`, returning how many subscribers received it
    pub fn publish(&self, event: LibraryEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LibraryEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
