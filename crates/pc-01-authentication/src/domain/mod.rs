//! Domain Layer - login results and authentication state
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod login;

pub use login::{AuthenticationStateEvent, LoginResult, LogoutResult};
