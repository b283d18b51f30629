//! Error type for task mutations.

use desk_core::errors::{CoreError, ErrorKind};
use desk_db::error::DatabaseError;
use thiserror::Error;

/// Why a create/update did not go through.
///
/// `Rejected` carries the client-visible taxonomy; `Database` is a storage
/// failure outside of the assignee step and maps to `ErrorKind::Internal`.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl WorkflowError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(err) => err.kind(),
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Storage failure while assignee rows were being replaced.
    pub(crate) fn assignees_not_saved(err: &DatabaseError) -> Self {
        Self::Rejected(CoreError::BadRequest(format!(
            "Assignees could not be saved: {err}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::enums::EntityType;

    #[test]
    fn kind_follows_core_error() {
        let err: WorkflowError = CoreError::not_found(EntityType::Project, "prj-1").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "project with id prj-1 was not found");
    }

    #[test]
    fn assignee_storage_failure_is_bad_request() {
        let err = WorkflowError::assignees_not_saved(&DatabaseError::NoResult);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(WorkflowError::from(DatabaseError::NoResult).kind(), ErrorKind::Internal);
    }
}
