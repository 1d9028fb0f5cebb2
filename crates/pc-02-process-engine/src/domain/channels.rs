//! Channel naming shared with the remote engine.

use shared_types::ParticipantId;

pub const ROLE_CHANNEL_PREFIX: &str = "/role/";
pub const PARTICIPANT_CHANNEL_PREFIX: &str = "/participant/";
pub const NODE_CHANNEL_PREFIX: &str = "/processengine/node/";

/// Segment of a `/`-split participant channel holding the participant id.
const PARTICIPANT_SEGMENT: usize = 2;

/// Broadcast channel for every identity holding `role`.
pub fn role_channel(role: &str) -> String {
    format!("{ROLE_CHANNEL_PREFIX}{role}")
}

/// Reply channel scoped to one process instance.
pub fn participant_channel(participant_id: &ParticipantId) -> String {
    format!("{PARTICIPANT_CHANNEL_PREFIX}{participant_id}")
}

/// Outbound channel addressing a task node.
pub fn node_channel(user_task_id: &str) -> String {
    format!("{NODE_CHANNEL_PREFIX}{user_task_id}")
}

/// Extract the participant id from a participant channel name.
///
/// Returns `None` for role channels and anything else without the
/// participant prefix.
pub fn participant_from_channel(channel: &str) -> Option<ParticipantId> {
    if !channel.starts_with(PARTICIPANT_CHANNEL_PREFIX) {
        return None;
    }
    channel
        .split('/')
        .nth(PARTICIPANT_SEGMENT)
        .filter(|segment| !segment.is_empty())
        .map(ParticipantId::from)
}
