use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Status, User};

/// A user assigned to a task, with a per-assignment status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assignee {
    pub user: User,
    pub status: Status,
    pub actual: bool,
}
