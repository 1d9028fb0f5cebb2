//! Error types for the Authentication subsystem

use shared_types::RepositoryError;
use thiserror::Error;

/// Errors that can occur during login or logout
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Identity service error: {0}")]
    Repository(#[from] RepositoryError),
}
