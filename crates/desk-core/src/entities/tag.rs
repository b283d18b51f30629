use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A label attached to tasks. Tags created implicitly by a task patch are
/// private (`public == false`) and owned by the acting user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub title: String,
    pub color: String,
    pub public: bool,
    pub created_by: Option<String>,
}
