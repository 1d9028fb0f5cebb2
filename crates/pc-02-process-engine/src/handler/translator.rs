//! Message translator.
//!
//! Classifies one bus message into an [`EngineEvent`]:
//!
//! 1. Anything that is not a data message passes through under its channel.
//! 2. `userTask` becomes `RenderUserTask` with the derived widget config.
//! 3. `endEvent` becomes `ProcessEnd`. On a participant channel the instance
//!    is looked up from the participant id and its correlation released; on
//!    a role channel the instance cannot be known.

use shared_bus::{actions, Message, MessagePublisher};
use shared_types::UserTaskMessageData;
use tracing::{info, warn};

use crate::domain::{
    derive_task_config, participant_from_channel, CorrelationSubscriber, CorrelationTable,
};
use crate::events::EngineEvent;

pub fn translate<B, S>(
    bus: &B,
    channel: &str,
    message: &Message,
    correlations: &mut CorrelationTable,
    subscriber: &mut S,
) -> EngineEvent
where
    B: MessagePublisher + ?Sized,
    S: CorrelationSubscriber + ?Sized,
{
    if !bus.is_data_message(message) {
        return passthrough(channel, message);
    }

    match message.action() {
        Some(actions::USER_TASK) => user_task(channel, message),
        Some(actions::END_EVENT) => process_end(channel, correlations, subscriber),
        _ => passthrough(channel, message),
    }
}

fn passthrough(channel: &str, message: &Message) -> EngineEvent {
    EngineEvent::Channel {
        channel: channel.to_string(),
        message: message.clone(),
    }
}

fn user_task(channel: &str, message: &Message) -> EngineEvent {
    let decoded = message
        .inner_data()
        .cloned()
        .map(serde_json::from_value::<UserTaskMessageData>);

    match decoded {
        Some(Ok(data)) => EngineEvent::RenderUserTask(derive_task_config(&data)),
        Some(Err(e)) => {
            warn!(channel = channel, error = %e, "Undecodable user task, passing through");
            passthrough(channel, message)
        }
        None => {
            warn!(channel = channel, "User task without data, passing through");
            passthrough(channel, message)
        }
    }
}

fn process_end<S>(
    channel: &str,
    correlations: &mut CorrelationTable,
    subscriber: &mut S,
) -> EngineEvent
where
    S: CorrelationSubscriber + ?Sized,
{
    let Some(participant_id) = participant_from_channel(channel) else {
        warn!(
            channel = channel,
            "Process end on a role channel, instance undetermined"
        );
        return EngineEvent::ProcessEnd(None);
    };

    let Some(process_instance_id) = correlations.reverse_lookup(&participant_id).cloned() else {
        warn!(
            channel = channel,
            participant_id = %participant_id,
            "Process end for unknown participant"
        );
        return EngineEvent::ProcessEnd(None);
    };

    correlations.release(&process_instance_id, subscriber);
    info!(
        process_instance_id = %process_instance_id,
        participant_id = %participant_id,
        "Process ended"
    );
    EngineEvent::ProcessEnd(Some(process_instance_id))
}
