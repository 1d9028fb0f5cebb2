use consumer_telemetry::TelemetryError;
use pc_01_authentication::AuthError;
use pc_02_process_engine::EngineError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by [`crate::ConsumerClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Process engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}
