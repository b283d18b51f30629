use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AttributeType;

/// Definition of a custom task field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TaskAttribute {
    pub id: String,
    pub title: String,
    pub attribute_type: AttributeType,
    pub required: bool,
    pub active: bool,
    /// Allowed values for `select`/`multiselect`. Empty means unrestricted.
    pub options: Vec<String>,
}

/// Typed value of a custom field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TaskDataValue {
    Text(String),
    Bool(bool),
    /// Unix epoch seconds.
    Date(i64),
}

impl TaskDataValue {
    /// Human-readable form used in change records.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bool(flag) => flag.to_string(),
            Self::Date(epoch) => chrono::DateTime::from_timestamp(*epoch, 0)
                .map_or_else(|| epoch.to_string(), |dt| dt.to_rfc3339()),
        }
    }
}

/// A custom field value stored on a task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TaskData {
    pub attribute: TaskAttribute,
    pub value: TaskDataValue,
}
