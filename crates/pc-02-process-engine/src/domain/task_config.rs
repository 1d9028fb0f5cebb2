//! Derivation of widget configurations from raw task data, and of the
//! result record sent back when a task is proceeded.

use serde_json::{Map, Value};
use shared_types::{
    FormFieldType, NodeDefFormField, UiConfig, UiConfigLayoutElement, UserTaskEntity,
    UserTaskMessageData,
};

use super::widget::{
    ConfirmAction, ConfirmWidgetAction, ConfirmWidgetConfig, FormWidgetConfig,
    FormWidgetEnumValue, FormWidgetField, UserTaskConfig, UserTaskProceedAction, WidgetConfig,
};

/// UI kind of a form task.
pub const UI_NAME_FORM: &str = "Form";
/// UI kind of a confirm task.
pub const UI_NAME_CONFIRM: &str = "Confirm";

const CONFIRM_LAYOUT_KEY: &str = "confirm";
const CANCEL_LAYOUT_KEY: &str = "cancel";
/// Result field carrying the confirm decision.
const CONFIRM_RESULT_FIELD: &str = "key";

/// Build the widget configuration for a task.
///
/// An unknown UI kind yields a configuration without a widget.
pub fn derive_task_config(data: &UserTaskMessageData) -> UserTaskConfig {
    let entity = &data.user_task_entity;
    let widget = match data.ui_name.as_str() {
        UI_NAME_FORM => Some(WidgetConfig::Form(form_widget(entity))),
        UI_NAME_CONFIRM => Some(WidgetConfig::Confirm(confirm_widget(
            data.ui_config.as_ref(),
        ))),
        _ => None,
    };

    UserTaskConfig {
        id: entity.id.clone(),
        title: entity.name.clone(),
        user_task_entity: entity.clone(),
        widget,
    }
}

fn form_widget(entity: &UserTaskEntity) -> FormWidgetConfig {
    FormWidgetConfig {
        fields: entity
            .node_def
            .extensions
            .form_fields
            .iter()
            .map(form_field)
            .collect(),
    }
}

fn form_field(field: &NodeDefFormField) -> FormWidgetField {
    let enum_values = (field.field_type == FormFieldType::Enumeration).then(|| {
        field
            .form_values
            .iter()
            .map(|allowed| FormWidgetEnumValue {
                label: allowed.name.clone(),
                value: allowed.id.clone(),
            })
            .collect()
    });

    FormWidgetField {
        id: field.id.clone(),
        label: field.label.clone(),
        field_type: field.field_type,
        default_value: field.default_value.clone(),
        value: None,
        enum_values,
    }
}

fn confirm_widget(ui_config: Option<&UiConfig>) -> ConfirmWidgetConfig {
    let Some(ui_config) = ui_config else {
        return ConfirmWidgetConfig::default();
    };

    ConfirmWidgetConfig {
        message: ui_config.message.clone(),
        actions: ui_config
            .layout
            .iter()
            .map(|element| ConfirmWidgetAction {
                label: element.label.clone(),
                action: confirm_action_for(element),
            })
            .collect(),
    }
}

/// Abstract intent of a confirm layout entry.
pub fn confirm_action_for(element: &UiConfigLayoutElement) -> Option<UserTaskProceedAction> {
    if element.key == CONFIRM_LAYOUT_KEY {
        Some(UserTaskProceedAction::Proceed)
    } else if element.key == CANCEL_LAYOUT_KEY || element.is_cancel {
        Some(UserTaskProceedAction::Cancel)
    } else {
        None
    }
}

/// Result record for proceeding a task.
///
/// Forms submit every field by id, `null` where no value was entered. Confirm
/// tasks submit `{"key": "confirm"}`, or `"decline"` when the action is cancel.
/// Tasks without a widget submit an empty record.
pub fn build_task_result(task: &UserTaskConfig, action: Option<UserTaskProceedAction>) -> Value {
    let mut result = Map::new();
    match &task.widget {
        Some(WidgetConfig::Form(form)) => {
            for field in &form.fields {
                result.insert(field.id.clone(), field.value.clone().unwrap_or(Value::Null));
            }
        }
        Some(WidgetConfig::Confirm(_)) => {
            let key = action.map_or(ConfirmAction::Confirm, ConfirmAction::from).key();
            result.insert(CONFIRM_RESULT_FIELD.to_string(), Value::from(key));
        }
        None => {}
    }
    Value::Object(result)
}
