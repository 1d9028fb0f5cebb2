//! Results of talking to the identity service.

use serde::{Deserialize, Serialize};
use shared_types::Identity;

/// Successful login as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResult {
    pub identity: Identity,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResult {
    pub result: bool,
}

/// Broadcast after the stored identity changed.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticationStateEvent {
    Login(Identity),
    Logout,
}

impl AuthenticationStateEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Logout => "logout",
        }
    }
}
