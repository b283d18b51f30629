//! Change ledger: what a task mutation changed, from what, to what.
//!
//! Every field and relation handler appends a `ChangeRecord` only when
//! [`params_are_different`] says the value actually moved. The ledger is
//! ephemeral: it feeds the response and the notification router and is never
//! stored, except as the serialized body of general notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// A field value as recorded in the ledger.
///
/// Dates serialize as RFC 3339 strings; `Null` serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Date(DateTime<Utc>),
}

impl ChangeValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |v| Self::Text(v.to_string()))
    }

    #[must_use]
    pub fn opt_date(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Null, Self::Date)
    }

    /// Join display names into one text value; an empty list is `Null`.
    #[must_use]
    pub fn list(items: &[String]) -> Self {
        if items.is_empty() {
            Self::Null
        } else {
            Self::Text(items.join(", "))
        }
    }

    /// Interpret string, integer and boolean forms of true/false.
    #[must_use]
    pub fn as_bool_like(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(1) => Some(true),
            Self::Int(0) => Some(false),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn loosely_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Text(b)) | (Self::Text(b), Self::Int(a)) => {
                b.trim() == a.to_string()
            }
            (Self::Date(a), Self::Date(b)) => a.timestamp() == b.timestamp(),
            (a, b) => a == b,
        }
    }
}

impl From<&serde_json::Value> for ChangeValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Int),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Whether `new` is a real change from `old`.
///
/// - `old == null` is unchanged against `null`, `"null"` and `"NULL"`.
///   The rule is one-sided: an old `"null"` string against a new `null` is a
///   change.
/// - When either side is a boolean, both sides are normalized from their
///   string/integer/boolean forms and compared as booleans.
/// - Everything else is value equality, with integers equal to their decimal
///   string form.
#[must_use]
pub fn params_are_different(old: &ChangeValue, new: &ChangeValue) -> bool {
    if old.is_null() {
        let unchanged = match new {
            ChangeValue::Null => true,
            ChangeValue::Text(s) => s == "null" || s == "NULL",
            _ => false,
        };
        return !unchanged;
    }

    if matches!(old, ChangeValue::Bool(_)) || matches!(new, ChangeValue::Bool(_)) {
        return match (old.as_bool_like(), new.as_bool_like()) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        };
    }

    !old.loosely_equal(new)
}

/// A user referenced by a requester/assigner change, kept so the router can
/// address notifications without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

impl From<&crate::entities::User> for Recipient {
    fn from(user: &crate::entities::User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// One detected mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(skip)]
    pub field: String,
    pub from: ChangeValue,
    pub to: ChangeValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from_users: Vec<Recipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to_users: Vec<Recipient>,
}

impl ChangeRecord {
    #[must_use]
    pub fn new(field: impl Into<String>, from: ChangeValue, to: ChangeValue) -> Self {
        Self {
            field: field.into(),
            from,
            to,
            from_users: Vec::new(),
            to_users: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_users(mut self, from_users: Vec<Recipient>, to_users: Vec<Recipient>) -> Self {
        self.from_users = from_users;
        self.to_users = to_users;
        self
    }
}

/// Insertion-ordered set of change records, at most one per field.
///
/// Serializes as a JSON object `{field: {from, to, ...}}` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLedger {
    records: Vec<ChangeRecord>,
}

impl ChangeLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Insert a record, replacing any earlier record for the same field.
    pub fn record(&mut self, record: ChangeRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.field == record.field) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Append `field: from → to` when the values differ. Returns whether a
    /// record was written.
    pub fn record_if_changed(
        &mut self,
        field: &str,
        from: ChangeValue,
        to: ChangeValue,
    ) -> bool {
        if !params_are_different(&from, &to) {
            return false;
        }
        self.record(ChangeRecord::new(field, from, to));
        true
    }

    /// Append a record for a set-valued relation when the display sets differ,
    /// ignoring order. Returns the record if one was written.
    pub fn record_set_change(
        &mut self,
        field: &str,
        old: &[String],
        new: &[String],
    ) -> Option<&ChangeRecord> {
        if same_members(old, new) {
            return None;
        }
        self.record(ChangeRecord::new(
            field,
            ChangeValue::list(old),
            ChangeValue::list(new),
        ));
        self.get(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.field == field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.field.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The serialized form used as a general notification body.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ChangeLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.field, record)?;
        }
        map.end()
    }
}

fn same_members(old: &[String], new: &[String]) -> bool {
    let mut old: Vec<&String> = old.iter().collect();
    let mut new: Vec<&String> = new.iter().collect();
    old.sort();
    old.dedup();
    new.sort();
    new.dedup();
    old == new
}
