//! # Shared Types Crate
//!
//! This crate contains the entities exchanged with the remote process engine
//! and the identity contract consumed by the process-engine subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Wire shapes of process definitions, user
//!   tasks and identities are defined here and nowhere else.
//! - **Opaque Identifiers**: Process instances, definitions and tasks are
//!   addressed by engine-assigned strings; participant ids are generated
//!   locally and never interpreted by the engine.
//! - **Observer, not interposition**: Identity changes are announced through
//!   hooks registered on an [`IdentityStore`].

pub mod entities;
pub mod errors;
pub mod identity;

pub use entities::*;
pub use errors::*;
pub use identity::{roles_of, HookId, IdentityChangeHook, IdentityStore, GUEST_ROLE};
