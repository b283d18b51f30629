//! Cross-cutting error types for the helpdesk engine.
//!
//! `CoreError` is the client-visible rejection taxonomy. Storage errors live in
//! `desk-db` and are unified with this one in `desk-workflow`.

use std::fmt;

use thiserror::Error;

use crate::enums::EntityType;

/// Coarse error category surfaced to the controller layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidParameters,
    AccessDenied,
    ResourceNotFound,
    BadRequest,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejections raised while validating and applying a task mutation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity_type} with id {id} was not found")]
    NotFound { entity_type: EntityType, id: String },

    /// Type, format, enum or invariant violation.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The acting user lacks the required permission.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// File metadata exists but the file itself is missing from storage.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A transactional step failed and was rolled back.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}
