//! Adapters Layer
//!
//! - `InMemoryTokenRepository`: holds the token and identity of the current
//!   session and announces identity changes to registered hooks

pub mod token_repository;

pub use token_repository::InMemoryTokenRepository;
