//! Action specs and their normalization.
//!
//! A rule's actions may be stored as a JSON string or as an already
//! structured JSON value. [`RawActions::normalize`] is the single place
//! that turns either shape into an ordered `Vec<ActionSpec>`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One declarative, side-effecting step of a rule.
///
/// The core treats it as opaque beyond ordering; only the action executor
/// interprets `action_type` and `parameters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_parameters")]
    pub parameters: serde_json::Value,
}

fn empty_parameters() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ActionSpec {
    /// Human-readable label: the name, or the type when unnamed.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.action_type
        } else {
            &self.name
        }
    }
}

impl std::fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.action_type, self.label())
    }
}

/// Actions as they arrive from storage or the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawActions {
    /// A JSON document held in a string.
    Serialized(String),
    /// An already-structured JSON value.
    Structured(serde_json::Value),
}

impl Default for RawActions {
    fn default() -> Self {
        Self::Structured(serde_json::Value::Array(Vec::new()))
    }
}

impl From<Vec<ActionSpec>> for RawActions {
    fn from(actions: Vec<ActionSpec>) -> Self {
        let values = actions
            .into_iter()
            .map(|action| {
                serde_json::json!({
                    "type": action.action_type,
                    "name": action.name,
                    "parameters": action.parameters,
                })
            })
            .collect();
        Self::Structured(serde_json::Value::Array(values))
    }
}

/// The actions value could not be turned into a structured list.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MalformedActionsError {
    /// The serialized form is not valid JSON.
    #[error("actions are not valid JSON")]
    Syntax(#[source] Arc<serde_json::Error>),

    /// The value is valid JSON but not a list.
    #[error("actions must be a list, got {0}")]
    NotAList(&'static str),

    /// A list element does not have the `{type, name, parameters}` shape.
    #[error("action #{index} is malformed")]
    Shape {
        index: usize,
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// A list element has an empty `type`.
    #[error("action #{0} has no type")]
    MissingType(usize),
}

impl RawActions {
    /// Normalize into an ordered list of [`ActionSpec`]s.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedActionsError`] when the value is not valid JSON,
    /// not a list, or contains an element that is not an action spec.
    pub fn normalize(&self) -> Result<Vec<ActionSpec>, MalformedActionsError> {
        let value = match self {
            Self::Serialized(text) => {
                serde_json::from_str(text)
                    .map_err(|err| MalformedActionsError::Syntax(Arc::new(err)))?
            }
            Self::Structured(value) => value.clone(),
        };

        let items = match value {
            serde_json::Value::Array(items) => items,
            other => return Err(MalformedActionsError::NotAList(json_kind(&other))),
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let spec: ActionSpec = serde_json::from_value(item)
                    .map_err(|source| MalformedActionsError::Shape {
                        index,
                        source: Arc::new(source),
                    })?;
                if spec.action_type.trim().is_empty() {
                    return Err(MalformedActionsError::MissingType(index));
                }
                Ok(spec)
            })
            .collect()
    }

    /// Rebuild from persisted text.
    ///
    /// A JSON string holding JSON is unwrapped once; text that is not JSON
    /// is kept as is, so it fails at normalization rather than on load.
    #[must_use]
    pub fn from_storage(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(serde_json::Value::String(inner)) => Self::Serialized(inner),
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Serialized(text),
        }
    }

    /// Serialized JSON text, as persisted.
    #[must_use]
    pub fn to_storage(&self) -> String {
        match self {
            Self::Serialized(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured() -> serde_json::Value {
        serde_json::json!([
            {"type": "send_email", "name": "Remind client", "parameters": {"template": "reminder"}},
            {"type": "create_task", "name": "Follow up"}
        ])
    }

    #[test]
    fn should_normalize_structured_actions_in_declared_order() {
        let actions = RawActions::Structured(structured()).normalize().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type, "send_email");
        assert_eq!(actions[1].name, "Follow up");
    }

    #[test]
    fn should_normalize_serialized_string_to_same_list_as_structured() {
        let from_string = RawActions::Serialized(structured().to_string())
            .normalize()
            .unwrap();
        let from_value = RawActions::Structured(structured()).normalize().unwrap();
        assert_eq!(from_string, from_value);
    }

    #[test]
    fn should_default_missing_parameters_to_empty_object() {
        let actions = RawActions::Structured(structured()).normalize().unwrap();
        assert_eq!(actions[1].parameters, serde_json::json!({}));
    }

    #[test]
    fn should_unwrap_double_encoded_actions_from_storage() {
        let stored = serde_json::Value::String(structured().to_string()).to_string();
        let actions = RawActions::from_storage(stored).normalize().unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn should_keep_unparsable_storage_text_for_normalization_to_reject() {
        let raw = RawActions::from_storage("not json".to_string());
        assert_eq!(raw, RawActions::Serialized("not json".to_string()));
        assert!(raw.normalize().is_err());
    }

    #[test]
    fn should_reject_unparsable_string() {
        let err = RawActions::Serialized("[{\"type\":".to_string())
            .normalize()
            .unwrap_err();
        assert!(matches!(err, MalformedActionsError::Syntax(_)));
    }

    #[test]
    fn should_reject_value_that_is_not_a_list() {
        let err = RawActions::Structured(serde_json::json!({"type": "send_email"}))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, MalformedActionsError::NotAList("an object")));
    }

    #[test]
    fn should_reject_element_without_type() {
        let err = RawActions::Structured(serde_json::json!([{"name": "x"}]))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, MalformedActionsError::Shape { index: 0, .. }));
    }

    #[test]
    fn should_reject_element_with_blank_type() {
        let err = RawActions::Structured(serde_json::json!([{"type": "send_email"}, {"type": " "}]))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, MalformedActionsError::MissingType(1)));
    }

    #[test]
    fn should_deserialize_string_field_as_serialized_variant() {
        let raw: RawActions = serde_json::from_value(serde_json::json!("[]")).unwrap();
        assert_eq!(raw, RawActions::Serialized("[]".to_string()));
    }

    #[test]
    fn should_label_unnamed_action_by_type() {
        let spec = ActionSpec {
            action_type: "send_email".to_string(),
            name: String::new(),
            parameters: serde_json::json!({}),
        };
        assert_eq!(spec.label(), "send_email");
        assert_eq!(spec.to_string(), "send_email(send_email)");
    }

    #[test]
    fn should_build_structured_actions_from_specs() {
        let spec = ActionSpec {
            action_type: "create_task".to_string(),
            name: "Call back".to_string(),
            parameters: serde_json::json!({"due_in_days": 2}),
        };
        let raw = RawActions::from(vec![spec.clone()]);
        assert_eq!(raw.normalize().unwrap(), vec![spec]);
    }
}
