//! # PC-02 Process Engine
//!
//! Client-side facade over a remote process engine. Starts process instances,
//! lists and completes user tasks, and turns engine notifications arriving on
//! the message bus into typed events.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `CorrelationTable`: process instance → participant id
//!   - `derive_task_config`: task payload → UI-agnostic widget description
//!   - channel naming (`/role/*`, `/participant/*`, `/processengine/node/*`)
//!
//! - **Ports Layer** (`ports/`)
//!   - `ProcessEngineApi`: Driving port (inbound API)
//!   - `ProcessEngineRepository`: Driven port (engine transport)
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `SubscriptionManager`: keeps bus subscriptions equal to the active
//!     role set plus one channel per live participant id
//!
//! - **Handler Layer** (`handler/`): bus message → `EngineEvent` translation
//!
//! - **Events Layer** (`events/`): typed events, filters, listeners and
//!   broadcast subscriptions
//!
//! - **Service Layer**: `ProcessEngineService` implements `ProcessEngineApi`
//!
//! ## Invariants
//!
//! - Subscribed channels ⊇ role channels of the current identity ∪
//!   `/role/guest` ∪ participant channels of every live correlation.
//! - At most one participant id per process instance; participant ids are
//!   never reused.
//! - A failed remote call leaves the correlation table and the subscription
//!   set as they were.
//!
//! ## Wiring
//!
//! ```ignore
//! use pc_02_process_engine::{EngineConfig, EventFilter, ProcessEngineService};
//! use shared_bus::InMemoryMessageBus;
//!
//! let bus = Arc::new(InMemoryMessageBus::new());
//! let engine = ProcessEngineService::new(EngineConfig::default(), repository, bus, identity_store)?;
//! engine.initialize()?;
//!
//! let mut tasks = engine.subscribe(EventFilter::kinds(vec![EventKind::RenderUserTask]));
//! let process_instance_id = engine.start_process_by_key("order").await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod events;
pub mod handler;
pub mod metrics;
pub mod ports;
mod router;
pub mod service;

// Re-exports for convenience
pub use adapters::SubscriptionManager;
pub use domain::{
    derive_task_config, ConfirmAction, ConfirmWidgetAction, ConfirmWidgetConfig,
    CorrelationSubscriber, CorrelationTable, EngineConfig, FormWidgetConfig, FormWidgetEnumValue,
    FormWidgetField, UserTaskConfig, UserTaskProceedAction, WidgetConfig, WidgetType,
};
pub use error::{EngineError, EngineResult};
pub use events::{
    EngineEvent, EngineEventListener, EventEmitter, EventFilter, EventKind, EventStream,
    Subscription,
};
pub use handler::translate;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{MockProcessEngineRepository, ProcessEngineApi, ProcessEngineRepository};
pub use service::ProcessEngineService;
