//! Inbound Ports (Driving Ports)

use async_trait::async_trait;
use shared_types::Identity;

use crate::domain::{LoginResult, LogoutResult};
use crate::error::AuthError;

/// Primary authentication API (Driving Port)
#[async_trait]
pub trait AuthenticationApi: Send + Sync {
    /// Log in and store the returned token and identity.
    ///
    /// On failure the stored token and identity are left untouched.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Log out and clear the stored token and identity.
    async fn logout(&self) -> Result<LogoutResult, AuthError>;

    fn get_token(&self) -> Option<String>;

    fn get_identity(&self) -> Option<Identity>;

    /// Whether a non-empty token is stored.
    fn has_token(&self) -> bool;
}
