use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stored file metadata. `path` is relative to the upload directory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FileMeta {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub path: String,
}

/// A file attached to a task, referenced by slug.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Attachment {
    pub slug: String,
    pub file_name: String,
}
