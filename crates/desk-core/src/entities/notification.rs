use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::NotificationKind;

/// An in-app notification about a task change, addressed to one user.
///
/// `body` is either a fixed sentence (requester/assigner changes) or the
/// JSON-serialized change ledger (general updates).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub task_id: String,
    pub created_by: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}
