//! Engine events and the surfaces that deliver them.

pub mod emitter;
pub mod engine_event;
pub mod subscription;

pub use emitter::{EngineEventListener, EventEmitter};
pub use engine_event::{EngineEvent, EventFilter, EventKind};
pub use subscription::{EventStream, Subscription};
