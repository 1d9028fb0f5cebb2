//! Message-routing core shared by the service and the bus handler.
//!
//! All correlation and subscription state sits behind one lock. The lock is
//! never held across a publish, an await, or an event emission: a bus that
//! delivers synchronously re-enters [`EngineRouter::route`], and listeners
//! may call back into the engine.

use parking_lot::Mutex;
use shared_bus::{Message, MessageBus, MessageHandler, SubscriptionError};
use shared_types::{roles_of, Identity, ParticipantId, ProcessInstanceId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::adapters::SubscriptionManager;
use crate::domain::{participant_from_channel, CorrelationSubscriber, CorrelationTable};
use crate::events::{EngineEvent, EventEmitter};
use crate::handler::bus_handler::EngineMessageHandler;
use crate::handler::translate;
use crate::metrics::Metrics;

struct RoutingState {
    subscriptions: SubscriptionManager,
    correlations: CorrelationTable,
    /// Participants opened for a start that has not returned yet, flagged
    /// once an end event arrived on their channel.
    unbound: HashMap<ParticipantId, bool>,
}

/// Outcome of binding a started instance to its participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindOutcome {
    Bound,
    /// The instance ended before its start returned; the channel is closed.
    AlreadyEnded,
    /// The instance or the participant is already correlated.
    Conflict,
}

pub(crate) struct EngineRouter {
    bus: Arc<dyn MessageBus>,
    routing: Mutex<RoutingState>,
    emitter: EventEmitter,
    metrics: Metrics,
}

impl EngineRouter {
    pub(crate) fn new(bus: Arc<dyn MessageBus>, event_channel_capacity: usize) -> Arc<Self> {
        Arc::new_cyclic(|router: &Weak<EngineRouter>| {
            let handler: Arc<dyn MessageHandler> =
                Arc::new(EngineMessageHandler::new(router.clone()));
            let subscriptions = SubscriptionManager::new(bus.clone(), handler);
            Self {
                bus,
                routing: Mutex::new(RoutingState {
                    subscriptions,
                    correlations: CorrelationTable::new(),
                    unbound: HashMap::new(),
                }),
                emitter: EventEmitter::new(event_channel_capacity),
                metrics: Metrics::new(),
            }
        })
    }

    pub(crate) fn bus(&self) -> &Arc<dyn MessageBus> {
        &self.bus
    }

    pub(crate) fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub(crate) fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub(crate) fn subscribe_guest(&self) -> Result<(), SubscriptionError> {
        self.routing.lock().subscriptions.subscribe_guest()
    }

    pub(crate) fn reconcile_roles(
        &self,
        old: &BTreeSet<String>,
        new: &BTreeSet<String>,
    ) -> Result<(), SubscriptionError> {
        self.routing.lock().subscriptions.reconcile(old, new)
    }

    /// Identity-change hook body. Runs synchronously inside the store's
    /// setter, so no delivery on a stale channel follows the change.
    pub(crate) fn on_identity_change(&self, old: Option<&Identity>, new: Option<&Identity>) {
        let (old_roles, new_roles) = (roles_of(old), roles_of(new));
        match self.reconcile_roles(&old_roles, &new_roles) {
            Ok(()) => debug!(
                identity = new.map_or("<anonymous>", |i| i.name.as_str()),
                roles = new_roles.len(),
                "Role subscriptions follow identity"
            ),
            Err(e) => warn!(error = %e, "Role reconciliation incomplete"),
        }
    }

    /// Mint a participant id and subscribe its channel.
    pub(crate) fn open_participant(&self) -> Result<ParticipantId, SubscriptionError> {
        let participant_id = ParticipantId::new();
        let mut routing = self.routing.lock();
        routing
            .subscriptions
            .add_correlation_subscription(&participant_id)?;
        routing.unbound.insert(participant_id.clone(), false);
        Ok(participant_id)
    }

    /// Undo [`Self::open_participant`] for an id that was never registered.
    pub(crate) fn abandon_participant(&self, participant_id: &ParticipantId) {
        let result = {
            let mut routing = self.routing.lock();
            routing.unbound.remove(participant_id);
            routing
                .subscriptions
                .remove_correlation_subscription(participant_id)
        };
        if let Err(e) = result {
            warn!(participant_id = %participant_id, error = %e, "Failed to drop participant channel");
        }
    }

    /// Record the instance id a start returned for a participant opened by
    /// [`Self::open_participant`].
    pub(crate) fn bind_participant(
        &self,
        process_instance_id: ProcessInstanceId,
        participant_id: ParticipantId,
    ) -> BindOutcome {
        let mut routing = self.routing.lock();
        let ended = routing.unbound.remove(&participant_id).unwrap_or(false);

        if ended {
            if let Err(e) = routing
                .subscriptions
                .remove_correlation_subscription(&participant_id)
            {
                warn!(participant_id = %participant_id, error = %e, "Failed to drop participant channel");
            }
            info!(
                process_instance_id = %process_instance_id,
                participant_id = %participant_id,
                "Process ended before its start returned"
            );
            return BindOutcome::AlreadyEnded;
        }

        if routing
            .correlations
            .register(process_instance_id, participant_id)
        {
            BindOutcome::Bound
        } else {
            BindOutcome::Conflict
        }
    }

    /// Participant id of a process instance, created on first use.
    ///
    /// The flag is `true` when this call created the correlation.
    pub(crate) fn participant_for(
        &self,
        process_instance_id: &str,
    ) -> Result<(ParticipantId, bool), SubscriptionError> {
        let mut routing = self.routing.lock();
        if let Some(existing) = routing.correlations.get(process_instance_id) {
            return Ok((existing.clone(), false));
        }
        let RoutingState {
            subscriptions,
            correlations,
            ..
        } = &mut *routing;
        correlations
            .get_or_create(process_instance_id, subscriptions)
            .map(|participant_id| (participant_id, true))
    }

    pub(crate) fn release(&self, process_instance_id: &str) -> Option<ParticipantId> {
        let mut routing = self.routing.lock();
        let RoutingState {
            subscriptions,
            correlations,
            ..
        } = &mut *routing;
        correlations.release(process_instance_id, subscriptions)
    }

    pub(crate) fn participant_id(&self, process_instance_id: &str) -> Option<ParticipantId> {
        self.routing
            .lock()
            .correlations
            .get(process_instance_id)
            .cloned()
    }

    pub(crate) fn correlation_count(&self) -> usize {
        self.routing.lock().correlations.len()
    }

    pub(crate) fn subscribed_channels(&self) -> BTreeSet<String> {
        self.routing.lock().subscriptions.subscribed_channels()
    }

    /// Translate a delivered message and emit the resulting event.
    pub(crate) fn route(&self, channel: &str, message: &Message) {
        self.metrics.record_message_received();

        let event = {
            let mut routing = self.routing.lock();
            let RoutingState {
                subscriptions,
                correlations,
                unbound,
            } = &mut *routing;
            let event = translate(&*self.bus, channel, message, correlations, subscriptions);
            if matches!(event, EngineEvent::ProcessEnd(None)) {
                if let Some(participant_id) = participant_from_channel(channel) {
                    if let Some(ended) = unbound.get_mut(&participant_id) {
                        *ended = true;
                    }
                }
            }
            event
        };

        match &event {
            EngineEvent::RenderUserTask(_) => self.metrics.record_task_rendered(),
            EngineEvent::ProcessEnd(process_instance_id) => self
                .metrics
                .record_process_ended(process_instance_id.is_some()),
            EngineEvent::Channel { .. } => {}
        }

        debug!(channel = channel, event = event.name(), "Message routed");
        self.emitter.emit(event);
    }
}
