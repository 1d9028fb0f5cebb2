//! Authentication Service
//!
//! Orchestrates the identity service and the token repository.

use async_trait::async_trait;
use shared_types::{Identity, IdentityStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::adapters::InMemoryTokenRepository;
use crate::domain::{AuthenticationStateEvent, LoginResult, LogoutResult};
use crate::error::AuthError;
use crate::ports::{AuthenticationApi, AuthenticationRepository};

/// Buffered state events per subscriber before lagging.
const STATE_CHANNEL_CAPACITY: usize = 16;

/// Authentication service.
pub struct AuthenticationService<R: AuthenticationRepository> {
    repository: Arc<R>,
    tokens: Arc<InMemoryTokenRepository>,
    state_tx: broadcast::Sender<AuthenticationStateEvent>,
}

impl<R: AuthenticationRepository> AuthenticationService<R> {
    pub fn new(repository: Arc<R>, tokens: Arc<InMemoryTokenRepository>) -> Self {
        let (state_tx, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            repository,
            tokens,
            state_tx,
        }
    }

    /// The identity store backing this service.
    pub fn identity_store(&self) -> Arc<InMemoryTokenRepository> {
        self.tokens.clone()
    }

    /// Receive login/logout notifications.
    pub fn subscribe_state(&self) -> broadcast::Receiver<AuthenticationStateEvent> {
        self.state_tx.subscribe()
    }

    fn announce(&self, event: AuthenticationStateEvent) {
        // No receivers is fine
        let _ = self.state_tx.send(event);
    }
}

#[async_trait]
impl<R: AuthenticationRepository> AuthenticationApi for AuthenticationService<R> {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        let result = self.repository.login(username, password).await?;

        self.tokens.set_token(Some(result.token.clone()));
        self.tokens.set_identity(Some(result.identity.clone()));
        self.announce(AuthenticationStateEvent::Login(result.identity.clone()));

        info!(
            user = %result.identity.name,
            roles = result.identity.roles.len(),
            "Logged in"
        );
        Ok(result)
    }

    async fn logout(&self) -> Result<LogoutResult, AuthError> {
        let result = self.repository.logout().await?;

        self.tokens.set_token(None);
        self.tokens.set_identity(None);
        self.announce(AuthenticationStateEvent::Logout);

        info!("Logged out");
        Ok(result)
    }

    fn get_token(&self) -> Option<String> {
        self.tokens.get_token()
    }

    fn get_identity(&self) -> Option<Identity> {
        self.tokens.get_identity()
    }

    fn has_token(&self) -> bool {
        self.tokens.get_token().is_some_and(|token| !token.is_empty())
    }
}
