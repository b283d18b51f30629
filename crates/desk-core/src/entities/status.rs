use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StatusFunction;

/// A workflow status. Titles are free-form; `function` drives invariants.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Status {
    pub id: String,
    pub title: String,
    pub color: String,
    pub function: StatusFunction,
}
