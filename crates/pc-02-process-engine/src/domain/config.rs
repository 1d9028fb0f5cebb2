//! Process engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default broadcast capacity for engine event subscriptions.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Page size used by list operations when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Configuration for the process engine service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Events buffered per broadcast subscriber before it lags.
    pub event_channel_capacity: usize,
    /// Page size for list operations called without a limit.
    pub default_page_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.event_channel_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "event_channel_capacity must be greater than 0".into(),
            ));
        }
        if self.default_page_size == 0 {
            return Err(EngineError::InvalidConfig(
                "default_page_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
