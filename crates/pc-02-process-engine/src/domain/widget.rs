//! UI-agnostic widget configuration of a user task.

use serde::{Deserialize, Serialize};
use shared_types::{FormFieldType, ProcessInstanceId, UserTaskEntity, UserTaskId};

/// Kind of input a user task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Form,
    Confirm,
}

/// Abstract intent of a confirm action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTaskProceedAction {
    Proceed,
    Cancel,
}

/// External result key sent to the engine for a confirm task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Decline,
}

impl ConfirmAction {
    pub fn key(self) -> &'static str {
        match self {
            ConfirmAction::Confirm => "confirm",
            ConfirmAction::Decline => "decline",
        }
    }
}

impl From<UserTaskProceedAction> for ConfirmAction {
    fn from(action: UserTaskProceedAction) -> Self {
        match action {
            UserTaskProceedAction::Proceed => ConfirmAction::Confirm,
            UserTaskProceedAction::Cancel => ConfirmAction::Decline,
        }
    }
}

/// One allowed value of an enumeration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormWidgetEnumValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormWidgetField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
    pub default_value: Option<serde_json::Value>,
    /// Value entered by the user, submitted on proceed.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<FormWidgetEnumValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormWidgetConfig {
    pub fields: Vec<FormWidgetField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmWidgetAction {
    pub label: String,
    /// Unset when the layout entry maps to neither proceed nor cancel.
    pub action: Option<UserTaskProceedAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmWidgetConfig {
    pub message: String,
    pub actions: Vec<ConfirmWidgetAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetConfig {
    Form(FormWidgetConfig),
    Confirm(ConfirmWidgetConfig),
}

impl WidgetConfig {
    pub fn widget_type(&self) -> WidgetType {
        match self {
            WidgetConfig::Form(_) => WidgetType::Form,
            WidgetConfig::Confirm(_) => WidgetType::Confirm,
        }
    }
}

/// Rendering-independent description of a pending user task.
///
/// `widget` is `None` when the task's UI kind is not recognised; such a task
/// cannot be rendered but can still be cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskConfig {
    pub id: UserTaskId,
    pub title: String,
    pub user_task_entity: UserTaskEntity,
    #[serde(default)]
    pub widget: Option<WidgetConfig>,
}

impl UserTaskConfig {
    pub fn widget_type(&self) -> Option<WidgetType> {
        self.widget.as_ref().map(WidgetConfig::widget_type)
    }

    pub fn is_renderable(&self) -> bool {
        self.widget.is_some()
    }

    /// Process instance the task belongs to.
    pub fn process_instance_id(&self) -> &ProcessInstanceId {
        &self.user_task_entity.process.id
    }

    pub fn form(&self) -> Option<&FormWidgetConfig> {
        match &self.widget {
            Some(WidgetConfig::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn confirm(&self) -> Option<&ConfirmWidgetConfig> {
        match &self.widget {
            Some(WidgetConfig::Confirm(confirm)) => Some(confirm),
            _ => None,
        }
    }

    /// Set the value of a form field.
    ///
    /// Returns `false` when the task is not a form or has no such field.
    pub fn set_field_value(&mut self, field_id: &str, value: serde_json::Value) -> bool {
        let Some(WidgetConfig::Form(form)) = &mut self.widget else {
            return false;
        };
        match form.fields.iter_mut().find(|field| field.id == field_id) {
            Some(field) => {
                field.value = Some(value);
                true
            }
            None => false,
        }
    }
}
