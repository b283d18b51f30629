//! Permission gate consumed by the engine.
//!
//! The engine never decides access itself: it names the permission it needs
//! and asks an [`AccessPolicy`] for a yes/no answer.

use std::collections::HashSet;
use std::fmt;

use desk_core::entities::User;
use desk_core::errors::CoreError;

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    CreateTaskInProject,
    UpdateTask,
    AssignUserToTask,
    AddTagToTask,
}

/// A permission together with the entities it is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    CreateTaskInProject { project_id: String },
    UpdateTask { task_id: String },
    AssignUserToTask { user_id: String, task_id: String },
    AddTagToTask { tag_id: String, task_id: String },
}

impl Permission {
    #[must_use]
    pub const fn kind(&self) -> PermissionKind {
        match self {
            Self::CreateTaskInProject { .. } => PermissionKind::CreateTaskInProject,
            Self::UpdateTask { .. } => PermissionKind::UpdateTask,
            Self::AssignUserToTask { .. } => PermissionKind::AssignUserToTask,
            Self::AddTagToTask { .. } => PermissionKind::AddTagToTask,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTaskInProject { project_id } => {
                write!(f, "create tasks in project {project_id}")
            }
            Self::UpdateTask { task_id } => write!(f, "update task {task_id}"),
            Self::AssignUserToTask { user_id, task_id } => {
                write!(f, "assign user {user_id} to task {task_id}")
            }
            Self::AddTagToTask { tag_id, task_id } => {
                write!(f, "add tag {tag_id} to task {task_id}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Yes/no permission decision for the acting user.
pub trait AccessPolicy: Send + Sync {
    fn is_granted(&self, actor: &User, permission: &Permission) -> bool;
}

/// Grants everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn is_granted(&self, _actor: &User, _permission: &Permission) -> bool {
        true
    }
}

/// Grants everything except the listed permission kinds.
#[derive(Debug, Clone, Default)]
pub struct DenyPermissions {
    denied: HashSet<PermissionKind>,
}

impl DenyPermissions {
    #[must_use]
    pub fn new(denied: impl IntoIterator<Item = PermissionKind>) -> Self {
        Self {
            denied: denied.into_iter().collect(),
        }
    }
}

impl AccessPolicy for DenyPermissions {
    fn is_granted(&self, _actor: &User, permission: &Permission) -> bool {
        !self.denied.contains(&permission.kind())
    }
}

/// Turn a refused permission into `AccessDenied`.
pub(crate) fn require(
    policy: &dyn AccessPolicy,
    actor: &User,
    permission: Permission,
) -> Result<(), CoreError> {
    if policy.is_granted(actor, &permission) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied(format!(
            "{} may not {permission}",
            actor.username
        )))
    }
}
