//! Typed request body for task create/update.
//!
//! Every field is `Option<Value>`: `None` means "not supplied", while an
//! explicit JSON `null` is kept as `Some(Value::Null)` so it can clear.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use desk_core::errors::CoreError;

use crate::validate::{ScalarField, is_null_like, parse_id};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub work_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub important: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub work: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub work_time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub started_at: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub closed_at: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub project_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub status_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub requester_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub company_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub tag: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub assigned: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub attachment: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub task_data: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// Parse a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameters` for malformed JSON or unknown keys.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        serde_json::from_str(body)
            .map_err(|e| CoreError::invalid(format!("Request body is not a valid task patch: {e}")))
    }

    #[must_use]
    pub const fn scalar(&self, field: ScalarField) -> Option<&Value> {
        match field {
            ScalarField::Title => self.title.as_ref(),
            ScalarField::WorkType => self.work_type.as_ref(),
            ScalarField::Important => self.important.as_ref(),
            ScalarField::Description => self.description.as_ref(),
            ScalarField::Work => self.work.as_ref(),
            ScalarField::WorkTime => self.work_time.as_ref(),
            ScalarField::StartedAt => self.started_at.as_ref(),
            ScalarField::Deadline => self.deadline.as_ref(),
            ScalarField::ClosedAt => self.closed_at.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Relation targets
// ---------------------------------------------------------------------------

/// Full replacement list for a set-valued relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    /// `null` / `"null"`: leave the relation empty.
    Clear,
    Items(Vec<Value>),
}

impl RelationTarget {
    /// Accepts a JSON array, a string holding a JSON array, or a comma list.
    ///
    /// # Errors
    ///
    /// Rejects objects, booleans and bare numbers.
    pub fn parse(field: &str, raw: &Value) -> Result<Self, CoreError> {
        if is_null_like(raw) {
            return Ok(Self::Clear);
        }
        match raw {
            Value::Array(items) => Ok(Self::Items(items.clone())),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => Ok(Self::Items(items)),
                _ => Ok(Self::Items(
                    s.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(|p| Value::String(p.to_string()))
                        .collect(),
                )),
            },
            _ => Err(CoreError::invalid(format!(
                "{field} must be a list, a comma separated string or \"null\""
            ))),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        match self {
            Self::Clear => &[],
            Self::Items(items) => items,
        }
    }
}

/// A plain string item (tag title, file slug).
///
/// # Errors
///
/// Rejects items that are not strings or numbers.
pub fn string_item(field: &str, item: &Value) -> Result<Option<String>, CoreError> {
    match item {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(CoreError::invalid(format!(
            "{field} items must be strings, got {other}"
        ))),
    }
}

/// One `{userId, statusId?}` entry of `assigned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeTarget {
    pub user_id: String,
    pub status_id: Option<String>,
}

impl AssigneeTarget {
    /// # Errors
    ///
    /// Rejects items that are not objects with a `userId`.
    pub fn parse(item: &Value) -> Result<Self, CoreError> {
        let Value::Object(map) = item else {
            return Err(CoreError::invalid(format!(
                "assigned items must be objects with a userId, got {item}"
            )));
        };
        let user_id = map
            .get("userId")
            .map(|raw| parse_id("assigned.userId", raw))
            .transpose()?
            .flatten()
            .ok_or_else(|| CoreError::invalid("assigned items must carry a userId"))?;
        let status_id = map
            .get("statusId")
            .map(|raw| parse_id("assigned.statusId", raw))
            .transpose()?
            .flatten();
        Ok(Self { user_id, status_id })
    }
}

/// `taskData` as `(attribute id, raw value)` pairs, ordered by attribute id.
///
/// # Errors
///
/// Rejects anything that is not an object (or a string holding one).
pub fn task_data_entries(raw: &Value) -> Result<Vec<(String, Value)>, CoreError> {
    let parsed;
    let object = match raw {
        Value::Object(map) => map,
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s).ok();
            match &parsed {
                Some(Value::Object(map)) => map,
                _ => return Err(task_data_shape_error()),
            }
        }
        _ => return Err(task_data_shape_error()),
    };
    Ok(object
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect())
}

fn task_data_shape_error() -> CoreError {
    CoreError::invalid("taskData must be an object keyed by task attribute id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn explicit_null_differs_from_absent() {
        let patch = TaskPatch::from_json(r#"{"deadline": null, "title": "x"}"#).unwrap();
        assert_eq!(patch.deadline, Some(Value::Null));
        assert_eq!(patch.started_at, None);
        assert_eq!(patch.scalar(ScalarField::Title), Some(&json!("x")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TaskPatch::from_json(r#"{"colour": "red"}"#).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn relation_target_forms() {
        assert_eq!(RelationTarget::parse("tag", &json!("NULL")).unwrap(), RelationTarget::Clear);
        assert_eq!(RelationTarget::parse("tag", &json!(null)).unwrap(), RelationTarget::Clear);
        assert_eq!(
            RelationTarget::parse("tag", &json!(["a", "b"])).unwrap(),
            RelationTarget::Items(vec![json!("a"), json!("b")])
        );
        assert_eq!(
            RelationTarget::parse("tag", &json!(r#"["a","b"]"#)).unwrap(),
            RelationTarget::Items(vec![json!("a"), json!("b")])
        );
        assert_eq!(
            RelationTarget::parse("tag", &json!("a, b,")).unwrap(),
            RelationTarget::Items(vec![json!("a"), json!("b")])
        );
        assert!(RelationTarget::parse("tag", &json!({"a": 1})).is_err());
        assert!(RelationTarget::parse("tag", &json!(true)).is_err());
    }

    #[test]
    fn assignee_targets() {
        assert_eq!(
            AssigneeTarget::parse(&json!({"userId": 5})).unwrap(),
            AssigneeTarget {
                user_id: "5".into(),
                status_id: None
            }
        );
        assert_eq!(
            AssigneeTarget::parse(&json!({"userId": "usr-1", "statusId": "sts-2"}))
                .unwrap()
                .status_id
                .as_deref(),
            Some("sts-2")
        );
        assert!(AssigneeTarget::parse(&json!("usr-1")).is_err());
        assert!(AssigneeTarget::parse(&json!({"statusId": "sts-2"})).is_err());
    }

    #[test]
    fn task_data_accepts_object_or_json_string() {
        let entries = task_data_entries(&json!({"atr-1": "x"})).unwrap();
        assert_eq!(entries, vec![("atr-1".to_string(), json!("x"))]);
        assert_eq!(task_data_entries(&json!(r#"{"atr-1": 2}"#)).unwrap().len(), 1);
        assert!(task_data_entries(&json!(["atr-1"])).is_err());
    }
}
