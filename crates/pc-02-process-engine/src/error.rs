//! Error types for the Process Engine subsystem

use shared_bus::{BusError, SubscriptionError};
use shared_types::{ParticipantId, ProcessInstanceId, RepositoryError};
use thiserror::Error;

/// Errors that can occur in the Process Engine subsystem
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Message bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("Process instance {process_instance_id} is already correlated to {participant_id}")]
    CorrelationConflict {
        process_instance_id: ProcessInstanceId,
        participant_id: ParticipantId,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
