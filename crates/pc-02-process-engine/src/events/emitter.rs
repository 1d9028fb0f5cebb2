//! # Event Emitter
//!
//! Fans each engine event out to synchronous listeners, in registration
//! order, and then to broadcast subscriptions.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

use super::engine_event::{EngineEvent, EventFilter};
use super::subscription::{EventStream, Subscription};

/// Observer of engine events, called on the delivering thread.
pub trait EngineEventListener: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

impl<F> EngineEventListener for F
where
    F: Fn(&EngineEvent) + Send + Sync,
{
    fn on_event(&self, event: &EngineEvent) {
        self(event)
    }
}

type Listeners = Vec<(EventFilter, Arc<dyn EngineEventListener>)>;

pub struct EventEmitter {
    listeners: RwLock<Listeners>,
    sender: broadcast::Sender<EngineEvent>,
}

impl EventEmitter {
    /// Create an emitter whose subscriptions buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            listeners: RwLock::new(Vec::new()),
            sender,
        }
    }

    pub fn add_listener(&self, filter: EventFilter, listener: Arc<dyn EngineEventListener>) {
        self.listeners.write().push((filter, listener));
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.sender.subscribe(), filter)
    }

    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    /// Deliver an event.
    ///
    /// Returns the number of listeners it reached. Listeners may register
    /// further listeners or re-enter the engine while being called.
    pub fn emit(&self, event: EngineEvent) -> usize {
        let listeners: Listeners = self.listeners.read().clone();

        let mut delivered = 0;
        for (filter, listener) in &listeners {
            if filter.matches(&event) {
                listener.on_event(&event);
                delivered += 1;
            }
        }

        trace!(
            event = event.name(),
            listeners = delivered,
            subscribers = self.sender.receiver_count(),
            "Engine event emitted"
        );

        // No subscribers is fine
        let _ = self.sender.send(event);
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
