//! # Core Domain Entities
//!
//! Defines the entities exchanged with the remote process engine.
//!
//! ## Clusters
//!
//! - **Identity**: `Identity`, `ParticipantId`
//! - **Process Definitions**: `ProcessDefEntity`, `Pagination`
//! - **User Tasks**: `UserTaskEntity`, `NodeDef`, `NodeDefFormField`,
//!   `UiConfig`, `UserTaskMessageData`
//!
//! Field names follow the engine's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// Engine-assigned identifier of a running process instance.
pub type ProcessInstanceId = String;

/// Engine-assigned identifier of a process definition.
pub type ProcessDefId = String;

/// Engine-assigned identifier of a pending user task.
pub type UserTaskId = String;

/// Locally generated correlation token for one process instance.
///
/// The engine addresses replies for a process to `/participant/<id>`; the id
/// is opaque to everyone but this client and is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Generate a fresh participant id (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An authenticated user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    /// Role names; each one maps to a `/role/<name>` channel.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Identity {
    /// Create an identity with the given roles.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// CLUSTER B: PROCESS DEFINITIONS & LISTINGS
// =============================================================================

/// One page of a listing returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination<T> {
    /// Total number of matching entries on the engine.
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
    pub data: Vec<T>,
}

/// A deployable process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefEntity {
    pub id: ProcessDefId,
    pub key: String,
    #[serde(default)]
    pub name: String,
}

// =============================================================================
// CLUSTER C: USER TASKS
// =============================================================================

/// Back-reference from a task to the process instance that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRef {
    pub id: ProcessInstanceId,
}

/// Data type of a form field as declared in the process model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFieldType {
    String,
    Long,
    Boolean,
    Date,
    /// Value must be one of the field's `form_values`.
    Enumeration,
    #[serde(other)]
    Unknown,
}

/// One allowed value of an enumeration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefFormFieldValue {
    /// External identifier submitted back to the engine.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A form field declared on a user-task node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefFormField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub form_values: Vec<NodeDefFormFieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefExtensions {
    #[serde(default)]
    pub form_fields: Vec<NodeDefFormField>,
}

/// The model node a user task was created from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub extensions: NodeDefExtensions,
}

/// A pending user task as stored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskEntity {
    pub id: UserTaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    pub process: ProcessRef,
    #[serde(default)]
    pub node_def: NodeDef,
}

/// One button of a confirmation layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfigLayoutElement {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_cancel: bool,
}

/// UI hints attached to a confirmation task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub layout: Vec<UiConfigLayoutElement>,
}

/// Payload of a `userTask` notification and of a task-data lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskMessageData {
    pub user_task_entity: UserTaskEntity,
    /// UI kind discriminator, `"Form"` or `"Confirm"`.
    #[serde(default)]
    pub ui_name: String,
    #[serde(default)]
    pub ui_config: Option<UiConfig>,
}
