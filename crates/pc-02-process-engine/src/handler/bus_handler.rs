//! Bus handler feeding delivered messages into the engine router.

use shared_bus::{Message, MessageHandler};
use std::sync::Weak;
use tracing::debug;

use crate::router::EngineRouter;

/// The single handler the engine subscribes on every channel.
///
/// Holds the router weakly; the router owns the subscriptions that own this
/// handler.
pub(crate) struct EngineMessageHandler {
    router: Weak<EngineRouter>,
}

impl EngineMessageHandler {
    pub(crate) fn new(router: Weak<EngineRouter>) -> Self {
        Self { router }
    }
}

impl MessageHandler for EngineMessageHandler {
    fn handle(&self, channel: &str, message: &Message) {
        match self.router.upgrade() {
            Some(router) => router.route(channel, message),
            None => debug!(channel = channel, "Engine dropped, message ignored"),
        }
    }
}
