//! Bus subscription manager.
//!
//! Tracks which role and participant channels the engine handler is
//! subscribed to and keeps that set equal to the current identity's roles
//! plus the guest role, plus one channel per live correlation.

use shared_bus::{ChannelSubscriber, MessageBus, MessageHandler, SubscriptionError};
use shared_types::{ParticipantId, GUEST_ROLE};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{participant_channel, role_channel, CorrelationSubscriber};

/// Subscription manager
pub struct SubscriptionManager {
    bus: Arc<dyn MessageBus>,
    /// Handler every engine channel delivers to
    handler: Arc<dyn MessageHandler>,
    /// Roles whose channel is subscribed
    roles: BTreeSet<String>,
    /// Participants whose channel is subscribed
    participants: BTreeSet<ParticipantId>,
}

impl SubscriptionManager {
    pub fn new(bus: Arc<dyn MessageBus>, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            bus,
            handler,
            roles: BTreeSet::new(),
            participants: BTreeSet::new(),
        }
    }

    /// Subscribe the guest channel. It stays subscribed for the life of the
    /// manager.
    pub fn subscribe_guest(&mut self) -> Result<(), SubscriptionError> {
        self.subscribe_role(GUEST_ROLE)
    }

    /// Bring role subscriptions in line after an identity change.
    ///
    /// Equal role sets are a no-op. Otherwise the subscribed roles converge
    /// to `new` plus the guest role, whatever was subscribed before. Every
    /// change is attempted; the first failure is returned.
    pub fn reconcile(
        &mut self,
        old: &BTreeSet<String>,
        new: &BTreeSet<String>,
    ) -> Result<(), SubscriptionError> {
        if old == new {
            return Ok(());
        }

        let mut target = new.clone();
        target.insert(GUEST_ROLE.to_string());

        let stale: Vec<String> = self.roles.difference(&target).cloned().collect();
        let missing: Vec<String> = target.difference(&self.roles).cloned().collect();

        let mut first_error = None;
        for role in &stale {
            if let Err(e) = self.unsubscribe_role(role) {
                warn!(role = %role, error = %e, "Failed to unsubscribe role channel");
                first_error.get_or_insert(e);
            }
        }
        for role in &missing {
            if let Err(e) = self.subscribe_role(role) {
                warn!(role = %role, error = %e, "Failed to subscribe role channel");
                first_error.get_or_insert(e);
            }
        }

        debug!(
            removed = stale.len(),
            added = missing.len(),
            roles = self.roles.len(),
            "Role subscriptions reconciled"
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Roles whose channel is currently subscribed.
    pub fn subscribed_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Every channel currently subscribed, role and participant.
    pub fn subscribed_channels(&self) -> BTreeSet<String> {
        self.roles
            .iter()
            .map(|role| role_channel(role))
            .chain(self.participants.iter().map(participant_channel))
            .collect()
    }

    fn subscribe_role(&mut self, role: &str) -> Result<(), SubscriptionError> {
        if self.roles.contains(role) {
            return Ok(());
        }
        self.bus.subscribe(&role_channel(role), self.handler.clone())?;
        self.roles.insert(role.to_string());
        debug!(role = role, "Role channel subscribed");
        Ok(())
    }

    fn unsubscribe_role(&mut self, role: &str) -> Result<(), SubscriptionError> {
        if role == GUEST_ROLE || !self.roles.contains(role) {
            return Ok(());
        }
        self.bus.unsubscribe(&role_channel(role), &self.handler)?;
        self.roles.remove(role);
        debug!(role = role, "Role channel unsubscribed");
        Ok(())
    }
}

impl CorrelationSubscriber for SubscriptionManager {
    fn add_correlation_subscription(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<(), SubscriptionError> {
        if self.participants.contains(participant_id) {
            return Ok(());
        }
        self.bus
            .subscribe(&participant_channel(participant_id), self.handler.clone())?;
        self.participants.insert(participant_id.clone());
        Ok(())
    }

    fn remove_correlation_subscription(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<(), SubscriptionError> {
        if !self.participants.contains(participant_id) {
            return Ok(());
        }
        self.bus
            .unsubscribe(&participant_channel(participant_id), &self.handler)?;
        self.participants.remove(participant_id);
        Ok(())
    }
}
