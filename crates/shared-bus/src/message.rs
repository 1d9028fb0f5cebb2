//! # Bus Messages
//!
//! The envelope every message on the bus travels in.

use serde::{Deserialize, Serialize};
use shared_types::ParticipantId;
use uuid::Uuid;

/// Action discriminators carried in a data message's payload.
pub mod actions {
    /// Engine asks for user input.
    pub const USER_TASK: &str = "userTask";
    /// A process instance reached an end event.
    pub const END_EVENT: &str = "endEvent";
    /// Client submits the result of a user task.
    pub const PROCEED: &str = "proceed";
    /// Client raises an event on a task node.
    pub const EVENT: &str = "event";
}

/// `eventType` of the event raised to cancel a user task.
pub const CANCEL_EVENT_TYPE: &str = "cancel";

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub id: Uuid,
    /// Sender's correlation token, present on client-originated data messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl MessageMetadata {
    fn new(participant_id: Option<ParticipantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id,
            timestamp: now_ms(),
        }
    }
}

/// A message as it travels over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub metadata: MessageMetadata,
    /// Payload. Data messages carry `{ "action": ..., ... }` here.
    pub data: serde_json::Value,
}

impl Message {
    /// A message without a participant tag.
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            metadata: MessageMetadata::new(None),
            data,
        }
    }

    /// A data message tagged with the sender's participant id.
    pub fn data_message(data: serde_json::Value, participant_id: ParticipantId) -> Self {
        Self {
            metadata: MessageMetadata::new(Some(participant_id)),
            data,
        }
    }

    /// The action discriminator, if this is a data message.
    pub fn action(&self) -> Option<&str> {
        self.data.get("action").and_then(serde_json::Value::as_str)
    }

    /// The nested `data` field of the payload.
    pub fn inner_data(&self) -> Option<&serde_json::Value> {
        self.data.get("data")
    }

    pub fn participant_id(&self) -> Option<&ParticipantId> {
        self.metadata.participant_id.as_ref()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        // Clock before the epoch
        .unwrap_or(0)
}
