//! # Identity Store Contract
//!
//! The process engine follows the active identity by registering a hook on
//! the store rather than wrapping its mutator. The storage mechanism itself
//! is not part of the contract.

use crate::entities::Identity;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Role every client holds, authenticated or not.
pub const GUEST_ROLE: &str = "guest";

/// Hook fired on every identity change with `(old, new)`.
///
/// Hooks run synchronously inside `set_identity`, so a hook observes the
/// change before any other caller can act on the new identity.
pub type IdentityChangeHook = Arc<dyn Fn(Option<&Identity>, Option<&Identity>) + Send + Sync>;

/// Registration handle returned by [`IdentityStore::on_identity_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub u64);

/// Holder of the current identity, with change notification.
pub trait IdentityStore: Send + Sync {
    /// The current identity, `None` when anonymous.
    fn get_identity(&self) -> Option<Identity>;

    /// Replace the current identity and notify all hooks.
    fn set_identity(&self, identity: Option<Identity>);

    /// Register a hook fired on every subsequent identity change.
    fn on_identity_change(&self, hook: IdentityChangeHook) -> HookId;

    /// Drop a registered hook. Returns `false` if it was already removed.
    fn remove_identity_hook(&self, id: HookId) -> bool;
}

/// Role set of an identity; anonymous maps to `{"guest"}`.
pub fn roles_of(identity: Option<&Identity>) -> BTreeSet<String> {
    match identity {
        Some(identity) => identity.roles.clone(),
        None => BTreeSet::from([GUEST_ROLE.to_string()]),
    }
}
