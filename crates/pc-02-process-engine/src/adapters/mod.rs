//! Adapters for the Process Engine subsystem.

pub mod subscriptions;

pub use subscriptions::SubscriptionManager;
