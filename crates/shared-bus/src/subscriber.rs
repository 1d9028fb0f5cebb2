//! # Channel Subscriber
//!
//! Defines the subscription side of the bus.

use crate::message::Message;
use std::sync::Arc;
use thiserror::Error;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus connection is gone.
    #[error("Message bus closed")]
    Closed,

    /// Channel names must be absolute, e.g. `/role/admin`.
    #[error("Invalid channel name: {0:?}")]
    InvalidChannel(String),
}

/// Callback invoked for every message delivered on a subscribed channel.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, channel: &str, message: &Message);
}

impl<F> MessageHandler for F
where
    F: Fn(&str, &Message) + Send + Sync,
{
    fn handle(&self, channel: &str, message: &Message) {
        self(channel, message)
    }
}

/// Trait for managing channel subscriptions on the bus.
///
/// A handler is identified by its `Arc` allocation: unsubscribing requires
/// the same `Arc` (or a clone of it) that was subscribed.
pub trait ChannelSubscriber: Send + Sync {
    /// Deliver messages on `channel` to `handler`. Subscribing a handler that
    /// is already subscribed to the channel is a no-op.
    fn subscribe(
        &self,
        channel: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), SubscriptionError>;

    /// Stop delivering `channel` to `handler`. A no-op when not subscribed.
    fn unsubscribe(
        &self,
        channel: &str,
        handler: &Arc<dyn MessageHandler>,
    ) -> Result<(), SubscriptionError>;
}

/// Identity of a handler allocation, ignoring the vtable.
pub(crate) fn handler_key(handler: &Arc<dyn MessageHandler>) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

/// Reject channel names the engine cannot route.
pub(crate) fn validate_channel(channel: &str) -> Result<(), SubscriptionError> {
    if channel.len() < 2 || !channel.starts_with('/') {
        return Err(SubscriptionError::InvalidChannel(channel.to_string()));
    }
    Ok(())
}
