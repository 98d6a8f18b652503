// ABOUTME: Event bus trait and its broadcast, null, and recording implementations
// ABOUTME: Dispatch is synchronous and never fails the caller

use crate::event::ThemeEvent;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

/// Event bus for dispatching theme events
pub trait EventBus {
    fn dispatch(&self, event: ThemeEvent);
}

/// Fan-out bus backed by a tokio broadcast channel.
///
/// Sending never blocks; subscribers that fall behind by more than the
/// channel capacity observe a lag instead of stalling the compiler.
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<ThemeEvent>,
}

impl BroadcastBus {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThemeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventBus for BroadcastBus {
    fn dispatch(&self, event: ThemeEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            trace!(event = name, "No subscribers for theme event");
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBus;

impl EventBus for NullBus {
    fn dispatch(&self, _event: ThemeEvent) {}
}

/// Keeps every dispatched event in memory, in order
#[derive(Debug, Default)]
pub struct RecordingBus {
    events: Mutex<Vec<ThemeEvent>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ThemeEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<ThemeEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventBus for RecordingBus {
    fn dispatch(&self, event: ThemeEvent) {
        self.events.lock().push(event);
    }
}
