//! Outbound Ports (Driven Ports)
//!
//! The identity service is reached through an `AuthenticationRepository`.
//! Its HTTP shape is owned by the adapter plugged in at wiring time.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Identity, RepositoryError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{LoginResult, LogoutResult};

/// Identity service transport (Driven Port)
#[async_trait]
pub trait AuthenticationRepository: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, RepositoryError>;

    async fn logout(&self) -> Result<LogoutResult, RepositoryError>;
}

/// In-memory identity service for tests and local wiring.
#[derive(Default)]
pub struct MockAuthenticationRepository {
    users: RwLock<HashMap<String, (String, Identity)>>,
    logins: AtomicU64,
    logouts: AtomicU64,
}

impl MockAuthenticationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user that can log in with `password`.
    pub fn with_user(self, username: &str, password: &str, identity: Identity) -> Self {
        self.users
            .write()
            .insert(username.to_string(), (password.to_string(), identity));
        self
    }

    /// Number of successful logins.
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logout_count(&self) -> u64 {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationRepository for MockAuthenticationRepository {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, RepositoryError> {
        let users = self.users.read();
        match users.get(username) {
            Some((expected, identity)) if expected == password => {
                self.logins.fetch_add(1, Ordering::SeqCst);
                Ok(LoginResult {
                    identity: identity.clone(),
                    token: format!("token-{}", uuid::Uuid::new_v4()),
                })
            }
            _ => Err(RepositoryError::Unauthorized),
        }
    }

    async fn logout(&self) -> Result<LogoutResult, RepositoryError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(LogoutResult { result: true })
    }
}
