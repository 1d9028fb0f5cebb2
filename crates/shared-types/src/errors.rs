//! # Error Types
//!
//! Defines error types shared by the repository collaborators of every
//! subsystem.

use thiserror::Error;

/// Failure of a call to a remote repository (identity service or engine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The transport could not reach the remote side.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote side answered with a non-success status.
    #[error("Remote error {status}: {message}")]
    Status { status: u16, message: String },

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credentials were rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
