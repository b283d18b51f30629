use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Customer company a task is billed to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub title: String,
}
