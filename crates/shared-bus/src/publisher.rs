//! # Message Publisher
//!
//! Defines the publishing side of the bus and the in-memory bus used by
//! tests and single-process deployments.

use crate::message::Message;
use crate::subscriber::{
    handler_key, validate_channel, ChannelSubscriber, MessageHandler, SubscriptionError,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ParticipantId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The transport refused or lost the message.
    #[error("Publish on {channel} failed: {reason}")]
    PublishFailed { channel: String, reason: String },

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

/// Trait for publishing messages to the bus.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message on a channel.
    ///
    /// # Returns
    ///
    /// The number of handlers the message was delivered to.
    async fn publish(&self, channel: &str, message: Message) -> Result<usize, BusError>;

    /// Whether the message carries an action discriminator.
    fn is_data_message(&self, message: &Message) -> bool {
        message.action().is_some()
    }

    /// Wrap a payload in a data message tagged with a participant id.
    fn create_data_message(
        &self,
        data: serde_json::Value,
        participant_id: &ParticipantId,
    ) -> Message {
        Message::data_message(data, participant_id.clone())
    }

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

type HandlerMap = HashMap<String, Vec<Arc<dyn MessageHandler>>>;

/// In-memory implementation of the message bus.
///
/// Delivery is synchronous: `publish` returns after every handler on the
/// channel has run. Suitable for tests and single-process use; a deployment
/// against a remote engine plugs in a network-backed bus instead.
pub struct InMemoryMessageBus {
    /// Handlers by exact channel name.
    handlers: RwLock<HandlerMap>,

    /// Total messages published.
    messages_published: AtomicU64,
}

impl InMemoryMessageBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            messages_published: AtomicU64::new(0),
        }
    }

    /// Number of handlers subscribed to a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.handlers.read().get(channel).map_or(0, Vec::len)
    }

    /// Whether any handler is subscribed to a channel.
    #[must_use]
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.subscriber_count(channel) > 0
    }

    /// All channels with at least one handler, sorted.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.handlers.read().keys().cloned().collect();
        channels.sort();
        channels
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSubscriber for InMemoryMessageBus {
    fn subscribe(
        &self,
        channel: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), SubscriptionError> {
        validate_channel(channel)?;

        let key = handler_key(&handler);
        let mut handlers = self.handlers.write();
        let entry = handlers.entry(channel.to_string()).or_default();
        if entry.iter().any(|existing| handler_key(existing) == key) {
            return Ok(());
        }
        entry.push(handler);

        debug!(channel = channel, handlers = entry.len(), "Channel subscribed");
        Ok(())
    }

    fn unsubscribe(
        &self,
        channel: &str,
        handler: &Arc<dyn MessageHandler>,
    ) -> Result<(), SubscriptionError> {
        validate_channel(channel)?;

        let key = handler_key(handler);
        let mut handlers = self.handlers.write();
        let Some(entry) = handlers.get_mut(channel) else {
            return Ok(());
        };

        entry.retain(|existing| handler_key(existing) != key);
        if entry.is_empty() {
            handlers.remove(channel);
        }

        debug!(channel = channel, "Channel unsubscribed");
        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, channel: &str, message: Message) -> Result<usize, BusError> {
        validate_channel(channel)?;

        // Always increment counter (publish was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so handlers can (un)subscribe while we deliver
        let receivers: Vec<Arc<dyn MessageHandler>> = self
            .handlers
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default();

        if receivers.is_empty() {
            warn!(
                channel = channel,
                message_id = %message.metadata.id,
                "Message dropped (no receivers)"
            );
            return Ok(0);
        }

        for handler in &receivers {
            handler.handle(channel, &message);
        }

        debug!(
            channel = channel,
            action = message.action().unwrap_or("-"),
            receivers = receivers.len(),
            "Message published"
        );
        Ok(receivers.len())
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
