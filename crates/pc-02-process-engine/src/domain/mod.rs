//! Domain layer for the Process Engine subsystem.
//!
//! Pure logic: channel naming, the correlation table, widget configuration
//! and its derivation from raw task data.

pub mod channels;
pub mod config;
pub mod correlation;
pub mod task_config;
pub mod widget;

pub use channels::{
    node_channel, participant_channel, participant_from_channel, role_channel,
    NODE_CHANNEL_PREFIX, PARTICIPANT_CHANNEL_PREFIX, ROLE_CHANNEL_PREFIX,
};
pub use config::EngineConfig;
pub use correlation::{CorrelationSubscriber, CorrelationTable};
pub use task_config::{build_task_result, derive_task_config};
pub use widget::{
    ConfirmAction, ConfirmWidgetAction, ConfirmWidgetConfig, FormWidgetConfig,
    FormWidgetEnumValue, FormWidgetField, UserTaskConfig, UserTaskProceedAction, WidgetConfig,
    WidgetType,
};
