//! # Engine Events
//!
//! Typed outcome of routing one bus message.

use shared_bus::Message;
use shared_types::ProcessInstanceId;

use crate::domain::UserTaskConfig;

/// Event name of a task asking for user input.
pub const RENDER_USER_TASK: &str = "renderUserTask";
/// Event name of a finished process instance.
pub const PROCESS_END: &str = "processEnd";

/// Events emitted by the process engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A user task is waiting for input.
    RenderUserTask(UserTaskConfig),

    /// A process instance reached an end event. `None` when the end arrived
    /// on a role channel and the instance cannot be determined.
    ProcessEnd(Option<ProcessInstanceId>),

    /// Any other message, delivered untouched under its channel name.
    Channel { channel: String, message: Message },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::RenderUserTask(_) => EventKind::RenderUserTask,
            EngineEvent::ProcessEnd(_) => EventKind::ProcessEnd,
            EngineEvent::Channel { .. } => EventKind::Channel,
        }
    }

    /// Name listeners know this event by: `renderUserTask`, `processEnd`, or
    /// the channel of a passthrough.
    pub fn name(&self) -> &str {
        match self {
            EngineEvent::RenderUserTask(_) => RENDER_USER_TASK,
            EngineEvent::ProcessEnd(_) => PROCESS_END,
            EngineEvent::Channel { channel, .. } => channel,
        }
    }
}

/// Event categories for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RenderUserTask,
    ProcessEnd,
    Channel,
}

/// Filter for event subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// Passthrough channels to include. Empty means every channel.
    pub channels: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            channels: Vec::new(),
        }
    }

    /// Create a filter for passthrough messages of one channel.
    #[must_use]
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            kinds: vec![EventKind::Channel],
            channels: vec![channel.into()],
        }
    }

    /// Filter for an event name: `renderUserTask`, `processEnd`, `*` for
    /// everything, or a raw channel name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        match name {
            "*" => Self::all(),
            RENDER_USER_TASK => Self::kinds(vec![EventKind::RenderUserTask]),
            PROCESS_END => Self::kinds(vec![EventKind::ProcessEnd]),
            channel => Self::channel(channel),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &EngineEvent) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        let channel_match = match event {
            EngineEvent::Channel { channel, .. } => {
                self.channels.is_empty() || self.channels.iter().any(|c| c == channel)
            }
            _ => true,
        };
        kind_match && channel_match
    }
}
