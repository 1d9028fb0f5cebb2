//! Token Repository
//!
//! Session holder for the token and identity returned by the identity
//! service. Identity changes are announced to every registered hook, which is
//! how the process engine keeps its role subscriptions in sync.

use parking_lot::RwLock;
use shared_types::{HookId, Identity, IdentityChangeHook, IdentityStore};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Default)]
struct Session {
    token: Option<String>,
    identity: Option<Identity>,
}

/// In-memory token and identity holder.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    session: RwLock<Session>,
    hooks: RwLock<Vec<(HookId, IdentityChangeHook)>>,
    next_hook_id: AtomicU64,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_token(&self) -> Option<String> {
        self.session.read().token.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.session.write().token = token;
    }

    /// Number of registered identity hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }
}

impl IdentityStore for InMemoryTokenRepository {
    fn get_identity(&self) -> Option<Identity> {
        self.session.read().identity.clone()
    }

    fn set_identity(&self, identity: Option<Identity>) {
        let old = std::mem::replace(&mut self.session.write().identity, identity.clone());

        // Hooks may read the store, so neither lock is held while they run
        let hooks: Vec<IdentityChangeHook> =
            self.hooks.read().iter().map(|(_, hook)| hook.clone()).collect();
        debug!(
            old = old.as_ref().map_or("<anonymous>", |i| i.name.as_str()),
            new = identity.as_ref().map_or("<anonymous>", |i| i.name.as_str()),
            hooks = hooks.len(),
            "Identity changed"
        );
        for hook in &hooks {
            hook(old.as_ref(), identity.as_ref());
        }
    }

    fn on_identity_change(&self, hook: IdentityChangeHook) -> HookId {
        let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
        self.hooks.write().push((id, hook));
        id
    }

    fn remove_identity_hook(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|(existing, _)| *existing != id);
        hooks.len() != before
    }
}
