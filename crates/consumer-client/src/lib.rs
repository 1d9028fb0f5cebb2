//! # Consumer Client
//!
//! Single entry point for applications talking to a remote process engine.
//! Wires the authentication subsystem's identity store into the process
//! engine, so logging in and out moves the engine's role subscriptions, and
//! feeds engine events into the Prometheus metrics.
//!
//! ```rust,ignore
//! let client = ConsumerClient::new(ConsumerConfig::from_env()?, auth_repo, engine_repo, bus)?;
//! client.initialize()?;
//! client.login("alice", "secret").await?;
//!
//! let mut tasks = client.subscribe_events(EventFilter::kinds(vec![EventKind::RenderUserTask]));
//! client.start_process_by_key("order").await?;
//! while let Some(EngineEvent::RenderUserTask(task)) = tasks.recv().await {
//!     client.proceed_user_task(&task, None).await?;
//! }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod config;
pub mod error;
pub mod listener;

pub use client::ConsumerClient;
pub use config::{ConfigError, ConsumerConfig};
pub use error::ClientError;
pub use listener::TelemetryListener;

/// `subsystem` field of this crate's log lines.
pub(crate) const SUBSYSTEM: &str = "client";
