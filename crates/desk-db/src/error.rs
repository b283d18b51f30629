//! Storage errors for the helpdesk database.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A statement failed or a column held a value we cannot decode.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A lookup that must produce a row produced none.
    #[error("No result returned")]
    NoResult,

    /// A stored task points at a row that no longer exists.
    #[error("Task references missing {what} {id}")]
    DanglingReference { what: String, id: String },

    #[error("Invalid JSON column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
