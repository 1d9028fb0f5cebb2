//! # Shared Bus - Channel-Addressed Message Bus
//!
//! Contracts and an in-memory implementation of the publish/subscribe bus the
//! remote process engine talks over.
//!
//! ## Channels
//!
//! ```text
//! /role/<role>                 broadcast to every identity holding <role>
//! /participant/<participant>   replies scoped to one process instance
//! /processengine/node/<task>   outbound results for one user task
//! ```
//!
//! ## Delivery
//!
//! - Handlers are invoked synchronously, in subscription order, on the
//!   publishing task.
//! - The bus never holds its own lock while a handler runs, so handlers may
//!   subscribe or unsubscribe re-entrantly.
//! - A *data message* carries a string `action` in its payload; anything else
//!   is raw and passed through untouched by consumers.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use message::{actions, Message, MessageMetadata, CANCEL_EVENT_TYPE};
pub use publisher::{BusError, InMemoryMessageBus, MessagePublisher};
pub use subscriber::{ChannelSubscriber, MessageHandler, SubscriptionError};

/// A bus that can both publish and manage channel subscriptions.
pub trait MessageBus: MessagePublisher + ChannelSubscriber {}

impl<T: MessagePublisher + ChannelSubscriber + ?Sized> MessageBus for T {}
