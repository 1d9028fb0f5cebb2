//! Correlation table.
//!
//! Maps each process instance started or served by this client to the
//! participant id used to tag outbound messages and to receive replies on
//! `/participant/{id}`. Entries live from first use until the process ends.

use shared_bus::SubscriptionError;
use shared_types::{ParticipantId, ProcessInstanceId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Subscription side effects of correlation changes.
///
/// Every participant id present in the table has its participant channel
/// subscribed; implementors keep the bus in step.
pub trait CorrelationSubscriber {
    fn add_correlation_subscription(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<(), SubscriptionError>;

    fn remove_correlation_subscription(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<(), SubscriptionError>;
}

/// Process instance → participant id.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: HashMap<ProcessInstanceId, ParticipantId>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, process_instance_id: &str) -> Option<&ParticipantId> {
        self.entries.get(process_instance_id)
    }

    /// Participant id for a process instance, minting and subscribing a
    /// fresh one when the instance has none yet.
    ///
    /// Nothing is recorded when the subscription fails.
    pub fn get_or_create<S>(
        &mut self,
        process_instance_id: &str,
        subscriber: &mut S,
    ) -> Result<ParticipantId, SubscriptionError>
    where
        S: CorrelationSubscriber + ?Sized,
    {
        if let Some(existing) = self.entries.get(process_instance_id) {
            return Ok(existing.clone());
        }

        let participant_id = ParticipantId::new();
        subscriber.add_correlation_subscription(&participant_id)?;
        self.entries
            .insert(process_instance_id.to_string(), participant_id.clone());

        debug!(
            process_instance_id = process_instance_id,
            participant_id = %participant_id,
            "Correlation created"
        );
        Ok(participant_id)
    }

    /// Record a participant id whose channel is already subscribed.
    ///
    /// Returns `false` and leaves the table unchanged when the instance is
    /// already correlated or the participant id is in use.
    pub fn register(
        &mut self,
        process_instance_id: ProcessInstanceId,
        participant_id: ParticipantId,
    ) -> bool {
        if self.entries.contains_key(&process_instance_id)
            || self.reverse_lookup(&participant_id).is_some()
        {
            return false;
        }

        debug!(
            process_instance_id = %process_instance_id,
            participant_id = %participant_id,
            "Correlation registered"
        );
        self.entries.insert(process_instance_id, participant_id);
        true
    }

    /// Drop the entry for a process instance and its channel subscription.
    ///
    /// Releasing an unknown instance is a no-op. The entry is removed even if
    /// unsubscribing fails; a stray subscription only delivers to an id the
    /// table no longer knows.
    pub fn release<S>(
        &mut self,
        process_instance_id: &str,
        subscriber: &mut S,
    ) -> Option<ParticipantId>
    where
        S: CorrelationSubscriber + ?Sized,
    {
        let participant_id = self.entries.remove(process_instance_id)?;

        if let Err(e) = subscriber.remove_correlation_subscription(&participant_id) {
            warn!(
                process_instance_id = process_instance_id,
                participant_id = %participant_id,
                error = %e,
                "Failed to unsubscribe released participant"
            );
        }

        debug!(
            process_instance_id = process_instance_id,
            participant_id = %participant_id,
            "Correlation released"
        );
        Some(participant_id)
    }

    /// Process instance owning a participant id.
    ///
    /// Linear scan; a client holds few live correlations at a time.
    pub fn reverse_lookup(&self, participant_id: &ParticipantId) -> Option<&ProcessInstanceId> {
        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == participant_id)
            .map(|(process_instance_id, _)| process_instance_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All live participant ids.
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.entries.values()
    }
}
