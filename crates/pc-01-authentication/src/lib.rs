//! # PC-01 Authentication
//!
//! Logs a user in and out against the identity service and holds the
//! resulting token and identity.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): login results and state events
//! - **Ports Layer** (`ports/`)
//!   - `AuthenticationApi`: Driving port (inbound API)
//!   - `AuthenticationRepository`: Driven port (identity service transport)
//! - **Adapters Layer** (`adapters/`)
//!   - `InMemoryTokenRepository`: token + identity holder, implements
//!     `shared_types::IdentityStore` so other subsystems can follow the
//!     active identity through change hooks
//! - **Service Layer**: `AuthenticationService` implements `AuthenticationApi`
//!
//! ## Usage
//!
//! ```ignore
//! use pc_01_authentication::{AuthenticationService, InMemoryTokenRepository};
//!
//! let tokens = Arc::new(InMemoryTokenRepository::new());
//! let auth = AuthenticationService::new(Arc::new(repository), tokens.clone());
//! auth.login("alice", "secret").await?;
//! assert!(auth.has_token());
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::InMemoryTokenRepository;
pub use domain::{AuthenticationStateEvent, LoginResult, LogoutResult};
pub use error::AuthError;
pub use ports::{AuthenticationApi, AuthenticationRepository, MockAuthenticationRepository};
pub use service::AuthenticationService;
