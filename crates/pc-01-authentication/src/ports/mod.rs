//! Ports Layer
//!
//! - Driving Port (inbound) - API for the consumer client
//! - Driven Port (outbound) - the identity service

pub mod inbound;
pub mod outbound;

pub use inbound::AuthenticationApi;
pub use outbound::{AuthenticationRepository, MockAuthenticationRepository};
