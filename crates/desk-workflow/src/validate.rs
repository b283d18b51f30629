//! Field transition validator.
//!
//! Turns a raw JSON value from a patch into a typed field value, or rejects
//! it with `INVALID_PARAMETERS`. Whether the typed value is a real change is
//! decided by [`desk_core::changes::params_are_different`] on the
//! [`ChangeValue`] projection of old and new.

use chrono::{DateTime, Utc};
use serde_json::Value;

use desk_core::changes::ChangeValue;
use desk_core::entities::{Task, TaskAttribute, TaskDataValue};
use desk_core::enums::{AttributeType, StatusFunction, WorkType};
use desk_core::errors::CoreError;

// ---------------------------------------------------------------------------
// Scalar fields
// ---------------------------------------------------------------------------

/// Task fields carried as plain values on the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Title,
    WorkType,
    Important,
    Description,
    Work,
    WorkTime,
    StartedAt,
    Deadline,
    ClosedAt,
}

impl ScalarField {
    /// Applied in this order; `closedAt` is resolved after the status.
    pub const ORDERED: [Self; 8] = [
        Self::Title,
        Self::WorkType,
        Self::Important,
        Self::Description,
        Self::Work,
        Self::WorkTime,
        Self::StartedAt,
        Self::Deadline,
    ];

    /// Patch key and change-ledger field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::WorkType => "workType",
            Self::Important => "important",
            Self::Description => "description",
            Self::Work => "work",
            Self::WorkTime => "workTime",
            Self::StartedAt => "startedAt",
            Self::Deadline => "deadline",
            Self::ClosedAt => "closedAt",
        }
    }

    #[must_use]
    pub fn read(self, task: &Task) -> FieldValue {
        match self {
            Self::Title => FieldValue::Text(task.title.clone()),
            Self::WorkType => FieldValue::WorkType(task.work_type),
            Self::Important => FieldValue::Bool(task.important),
            Self::Description => FieldValue::OptText(task.description.clone()),
            Self::Work => FieldValue::OptText(task.work.clone()),
            Self::WorkTime => FieldValue::OptText(task.work_time.clone()),
            Self::StartedAt => FieldValue::Date(task.started_at),
            Self::Deadline => FieldValue::Date(task.deadline),
            Self::ClosedAt => FieldValue::Date(task.closed_at),
        }
    }

    /// Store a value produced by [`validate_field`] for this field.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if the value shape does not belong to the field.
    pub fn write(self, task: &mut Task, value: FieldValue) -> Result<(), CoreError> {
        match (self, value) {
            (Self::Title, FieldValue::Text(v)) => task.title = v,
            (Self::WorkType, FieldValue::WorkType(v)) => task.work_type = v,
            (Self::Important, FieldValue::Bool(v)) => task.important = v,
            (Self::Description, FieldValue::OptText(v)) => task.description = v,
            (Self::Work, FieldValue::OptText(v)) => task.work = v,
            (Self::WorkTime, FieldValue::OptText(v)) => task.work_time = v,
            (Self::StartedAt, FieldValue::Date(v)) => task.started_at = v,
            (Self::Deadline, FieldValue::Date(v)) => task.deadline = v,
            (Self::ClosedAt, FieldValue::Date(v)) => task.closed_at = v,
            (field, value) => {
                return Err(CoreError::Other(anyhow::anyhow!(
                    "value {value:?} does not fit field {}",
                    field.name()
                )));
            }
        }
        Ok(())
    }
}

/// Typed result of validating one scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    OptText(Option<String>),
    WorkType(WorkType),
    Bool(bool),
    Date(Option<DateTime<Utc>>),
}

impl FieldValue {
    #[must_use]
    pub fn to_change_value(&self) -> ChangeValue {
        match self {
            Self::Text(v) => ChangeValue::text(v.as_str()),
            Self::OptText(v) => ChangeValue::opt_text(v.as_deref()),
            Self::WorkType(v) => ChangeValue::text(v.as_str()),
            Self::Bool(v) => ChangeValue::Bool(*v),
            Self::Date(v) => ChangeValue::opt_date(*v),
        }
    }
}

/// Validate `raw` as the new value of `field`.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameters` naming the field and the problem.
pub fn validate_field(field: ScalarField, raw: &Value) -> Result<FieldValue, CoreError> {
    let name = field.name();
    match field {
        ScalarField::Title => required_text(name, raw).map(FieldValue::Text),
        ScalarField::WorkType => parse_work_type(raw).map(FieldValue::WorkType),
        ScalarField::Important => parse_bool_like(name, raw).map(FieldValue::Bool),
        ScalarField::Description | ScalarField::Work | ScalarField::WorkTime => {
            optional_text(name, raw).map(FieldValue::OptText)
        }
        ScalarField::StartedAt | ScalarField::Deadline | ScalarField::ClosedAt => {
            parse_timestamp(name, raw).map(FieldValue::Date)
        }
    }
}

// ---------------------------------------------------------------------------
// Primitive parsers
// ---------------------------------------------------------------------------

/// The string `"null"` in any case, as sent by form-encoded clients.
#[must_use]
pub fn is_null_like(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().eq_ignore_ascii_case("null"),
        _ => false,
    }
}

fn required_text(field: &str, raw: &Value) -> Result<String, CoreError> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(CoreError::invalid(format!(
            "{field} is required and must be a non-empty string"
        ))),
    }
}

fn optional_text(field: &str, raw: &Value) -> Result<Option<String>, CoreError> {
    if is_null_like(raw) {
        return Ok(None);
    }
    match raw {
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(CoreError::invalid(format!("{field} must be a string"))),
    }
}

/// # Errors
///
/// Rejects anything outside the work type enumeration, listing allowed values.
pub fn parse_work_type(raw: &Value) -> Result<WorkType, CoreError> {
    let text = match raw {
        Value::String(s) => s.as_str(),
        _ => "",
    };
    WorkType::parse(text).ok_or_else(|| {
        CoreError::invalid(format!(
            "workType has invalid value '{}'. Allowed values: {}",
            raw_display(raw),
            WorkType::allowed_values()
        ))
    })
}

/// Accepts `true`/`false`, `1`/`0` and their string forms.
///
/// # Errors
///
/// Rejects any other value.
pub fn parse_bool_like(field: &str, raw: &Value) -> Result<bool, CoreError> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => ChangeValue::text(s.as_str()).as_bool_like(),
        _ => None,
    }
    .ok_or_else(|| {
        CoreError::invalid(format!(
            "{field} must be a boolean, got '{}'",
            raw_display(raw)
        ))
    })
}

/// Unix epoch seconds to a date. `null`, `"null"` and `0` clear the field.
///
/// # Errors
///
/// Rejects non-numeric or out-of-range values.
pub fn parse_timestamp(field: &str, raw: &Value) -> Result<Option<DateTime<Utc>>, CoreError> {
    if is_null_like(raw) {
        return Ok(None);
    }
    let epoch = parse_epoch(raw).ok_or_else(|| {
        CoreError::invalid(format!(
            "{field} '{}' is not a valid Timestamp format",
            raw_display(raw)
        ))
    })?;
    if epoch == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp(epoch, 0).map(Some).ok_or_else(|| {
        CoreError::invalid(format!("{field} '{epoch}' is not a valid Timestamp format"))
    })
}

fn parse_epoch(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ids arrive as strings or bare integers. `None` means an explicit clear.
///
/// # Errors
///
/// Rejects values that are neither.
pub fn parse_id(field: &str, raw: &Value) -> Result<Option<String>, CoreError> {
    if is_null_like(raw) {
        return Ok(None);
    }
    match raw {
        Value::String(s) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        _ => Err(CoreError::invalid(format!(
            "{field} must be an id, got '{}'",
            raw_display(raw)
        ))),
    }
}

fn raw_display(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Closing rules
// ---------------------------------------------------------------------------

/// Resulting `closedAt` for a task whose status function will be `function`.
///
/// `supplied` is `Some` when the patch carried `closedAt`. A non-closed
/// status without an explicit `closedAt` drops any existing value.
///
/// # Errors
///
/// Rejects a closed status without a date and a date on a non-closed status.
pub fn resolve_closed_at(
    function: StatusFunction,
    current: Option<DateTime<Utc>>,
    supplied: Option<Option<DateTime<Utc>>>,
) -> Result<Option<DateTime<Utc>>, CoreError> {
    let closing = function.requires_closed_at();
    let required = || {
        CoreError::invalid(format!(
            "closedAt is required when the status function is {}",
            StatusFunction::Closed.as_str().to_ascii_uppercase()
        ))
    };
    match supplied {
        Some(Some(_)) if !closing => Err(CoreError::invalid(format!(
            "closedAt can only be set when the status function is CLOSED, not {}",
            function.as_str().to_ascii_uppercase()
        ))),
        Some(Some(date)) => Ok(Some(date)),
        Some(None) if closing => Err(required()),
        Some(None) => Ok(None),
        None if closing => current.map(Some).ok_or_else(required),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Task data
// ---------------------------------------------------------------------------

/// Check a custom attribute value against the attribute's declared type.
///
/// Returns `Ok(None)` for a delete request (`null` / `"null"`); whether the
/// attribute may be deleted is up to the caller.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameters` naming the attribute.
pub fn coerce_task_data(
    attribute: &TaskAttribute,
    raw: &Value,
) -> Result<Option<TaskDataValue>, CoreError> {
    if is_null_like(raw) {
        return Ok(None);
    }
    let bad = |expected: &str| {
        CoreError::invalid(format!(
            "Invalid value '{}' for task attribute {} ({}): expected {expected}",
            raw_display(raw),
            attribute.title,
            attribute.id
        ))
    };

    let value = match attribute.attribute_type {
        AttributeType::Input | AttributeType::Textarea => match raw {
            Value::String(s) => TaskDataValue::Text(s.clone()),
            Value::Number(n) => TaskDataValue::Text(n.to_string()),
            _ => return Err(bad("text")),
        },
        AttributeType::Select => {
            let choice = match raw {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return Err(bad("one of the attribute options")),
            };
            if !is_option(attribute, &choice) {
                return Err(bad(&format!("one of: {}", attribute.options.join(", "))));
            }
            TaskDataValue::Text(choice)
        }
        AttributeType::Multiselect => {
            let choices = split_list(raw).ok_or_else(|| bad("a list of options"))?;
            if let Some(unknown) = choices.iter().find(|c| !is_option(attribute, c)) {
                return Err(CoreError::invalid(format!(
                    "Invalid option '{unknown}' for task attribute {} ({}): expected any of: {}",
                    attribute.title,
                    attribute.id,
                    attribute.options.join(", ")
                )));
            }
            TaskDataValue::Text(choices.join(","))
        }
        AttributeType::Integer => {
            let n = match raw {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| bad("an integer"))?;
            TaskDataValue::Text(n.to_string())
        }
        AttributeType::Decimal => match raw {
            Value::Number(n) => TaskDataValue::Text(n.to_string()),
            Value::String(s) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
                TaskDataValue::Text(s.trim().to_string())
            }
            _ => return Err(bad("a decimal number")),
        },
        AttributeType::Checkbox => TaskDataValue::Bool(
            parse_bool_like(&attribute.title, raw).map_err(|_| bad("a boolean"))?,
        ),
        AttributeType::Date => {
            TaskDataValue::Date(parse_epoch(raw).ok_or_else(|| bad("a Unix timestamp"))?)
        }
    };
    Ok(Some(value))
}

fn is_option(attribute: &TaskAttribute, choice: &str) -> bool {
    attribute.options.is_empty() || attribute.options.iter().any(|o| o == choice)
}

/// A JSON array, a string holding a JSON array, or a comma list.
fn split_list(raw: &Value) -> Option<Vec<String>> {
    let items: Vec<Value> = match raw {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => s.split(',').map(|p| Value::String(p.to_string())).collect(),
        },
        _ => return None,
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|item| item.as_ref().is_none_or(|s| !s.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use desk_core::errors::ErrorKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn attribute(attribute_type: AttributeType, options: &[&str]) -> TaskAttribute {
        TaskAttribute {
            id: "atr-00000001".into(),
            title: "Contract".into(),
            attribute_type,
            required: false,
            active: true,
            options: options.iter().map(|o| (*o).to_string()).collect(),
        }
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!("null"))]
    #[case(json!("NULL"))]
    #[case(json!(0))]
    #[case(json!("0"))]
    fn date_clear_forms(#[case] raw: Value) {
        assert_eq!(parse_timestamp("deadline", &raw).unwrap(), None);
    }

    #[test]
    fn date_from_epoch_number_or_string() {
        let expected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(
            parse_timestamp("deadline", &json!(1_700_000_000)).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("deadline", &json!("1700000000")).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn non_numeric_date_is_rejected() {
        let err = parse_timestamp("startedAt", &json!("tomorrow")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("not a valid Timestamp format"));
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("1"), true)]
    #[case(json!("false"), false)]
    fn important_accepts_bool_likes(#[case] raw: Value, #[case] expected: bool) {
        assert_eq!(
            validate_field(ScalarField::Important, &raw).unwrap(),
            FieldValue::Bool(expected)
        );
    }

    #[test]
    fn important_rejects_other_values() {
        assert!(validate_field(ScalarField::Important, &json!("maybe")).is_err());
        assert!(validate_field(ScalarField::Important, &json!(2)).is_err());
    }

    #[test]
    fn work_type_lists_allowed_values() {
        let err = validate_field(ScalarField::WorkType, &json!("gardening")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("gardening"));
        assert!(err.to_string().contains(&WorkType::allowed_values()));
    }

    #[test]
    fn title_must_be_non_empty() {
        assert!(validate_field(ScalarField::Title, &json!("  ")).is_err());
        assert!(validate_field(ScalarField::Title, &json!(null)).is_err());
        assert_eq!(
            validate_field(ScalarField::Title, &json!(" VPN ")).unwrap(),
            FieldValue::Text("VPN".into())
        );
    }

    #[test]
    fn optional_text_clears_on_null_forms() {
        for raw in [json!(null), json!("null"), json!("")] {
            assert_eq!(
                validate_field(ScalarField::Description, &raw).unwrap(),
                FieldValue::OptText(None)
            );
        }
        assert!(validate_field(ScalarField::Work, &json!({"a": 1})).is_err());
    }

    #[test]
    fn ids_accept_numbers() {
        assert_eq!(parse_id("statusId", &json!(5)).unwrap(), Some("5".into()));
        assert_eq!(parse_id("statusId", &json!("sts-1")).unwrap(), Some("sts-1".into()));
        assert_eq!(parse_id("statusId", &json!("null")).unwrap(), None);
        assert!(parse_id("statusId", &json!(1.5)).is_err());
    }

    #[test]
    fn closing_rules() {
        let now = Utc::now();
        let closed = StatusFunction::Closed;
        let open = StatusFunction::InProgress;

        assert!(resolve_closed_at(closed, None, None).is_err());
        assert!(resolve_closed_at(closed, None, Some(None)).is_err());
        assert_eq!(resolve_closed_at(closed, None, Some(Some(now))).unwrap(), Some(now));
        assert_eq!(resolve_closed_at(closed, Some(now), None).unwrap(), Some(now));

        let err = resolve_closed_at(open, None, Some(Some(now))).unwrap_err();
        assert!(err.to_string().contains("closedAt"));
        assert_eq!(resolve_closed_at(open, Some(now), None).unwrap(), None);
        assert_eq!(resolve_closed_at(open, None, Some(None)).unwrap(), None);
    }

    #[test]
    fn change_value_projection() {
        assert_eq!(FieldValue::Date(None).to_change_value(), ChangeValue::Null);
        assert_eq!(
            FieldValue::WorkType(WorkType::ItService).to_change_value(),
            ChangeValue::text(WorkType::ItService.as_str())
        );
        assert_eq!(
            FieldValue::OptText(Some("x".into())).to_change_value(),
            ChangeValue::text("x")
        );
    }

    #[test]
    fn select_must_be_an_option() {
        let attr = attribute(AttributeType::Select, &["gold", "silver"]);
        assert_eq!(
            coerce_task_data(&attr, &json!("gold")).unwrap(),
            Some(TaskDataValue::Text("gold".into()))
        );
        assert!(coerce_task_data(&attr, &json!("bronze")).is_err());
    }

    #[test]
    fn multiselect_accepts_json_or_comma_lists() {
        let attr = attribute(AttributeType::Multiselect, &["a", "b", "c"]);
        let expected = Some(TaskDataValue::Text("a,c".into()));
        assert_eq!(coerce_task_data(&attr, &json!(["a", "c"])).unwrap(), expected);
        assert_eq!(coerce_task_data(&attr, &json!(r#"["a","c"]"#)).unwrap(), expected);
        assert_eq!(coerce_task_data(&attr, &json!("a, c")).unwrap(), expected);
        assert!(coerce_task_data(&attr, &json!("a,z")).is_err());
    }

    #[rstest]
    #[case(AttributeType::Integer, json!("42"), TaskDataValue::Text("42".into()))]
    #[case(AttributeType::Decimal, json!("4.5"), TaskDataValue::Text("4.5".into()))]
    #[case(AttributeType::Checkbox, json!("1"), TaskDataValue::Bool(true))]
    #[case(AttributeType::Date, json!(1_700_000_000), TaskDataValue::Date(1_700_000_000))]
    #[case(AttributeType::Input, json!(7), TaskDataValue::Text("7".into()))]
    fn typed_values(
        #[case] attribute_type: AttributeType,
        #[case] raw: Value,
        #[case] expected: TaskDataValue,
    ) {
        let attr = attribute(attribute_type, &[]);
        assert_eq!(coerce_task_data(&attr, &raw).unwrap(), Some(expected));
    }

    #[rstest]
    #[case(AttributeType::Integer, json!("4.5"))]
    #[case(AttributeType::Decimal, json!("abc"))]
    #[case(AttributeType::Checkbox, json!("yes"))]
    #[case(AttributeType::Date, json!("soon"))]
    #[case(AttributeType::Input, json!([1]))]
    fn typed_values_reject_bad_input(#[case] attribute_type: AttributeType, #[case] raw: Value) {
        let err = coerce_task_data(&attribute(attribute_type, &[]), &raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("atr-00000001"));
    }

    #[test]
    fn null_requests_deletion() {
        let attr = attribute(AttributeType::Input, &[]);
        assert_eq!(coerce_task_data(&attr, &json!("null")).unwrap(), None);
    }
}
