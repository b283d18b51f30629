use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{
    Assignee, Attachment, Company, Project, Status, Tag, TaskData, User,
};
use crate::enums::WorkType;

/// The helpdesk work item: the aggregate every patch mutates.
///
/// Invariant: `closed_at.is_some()` exactly when `status.function` is
/// `closed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub work_type: WorkType,
    pub important: bool,
    pub work: Option<String>,
    pub work_time: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub status_change: Option<DateTime<Utc>>,
    pub status: Status,
    pub project: Option<Project>,
    pub company: Option<Company>,
    pub requested_by: User,
    pub created_by: User,
    pub tags: Vec<Tag>,
    pub assignees: Vec<Assignee>,
    pub attachments: Vec<Attachment>,
    pub custom_data: Vec<TaskData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the closing invariant currently holds.
    #[must_use]
    pub const fn closing_invariant_holds(&self) -> bool {
        self.status.function.requires_closed_at() == self.closed_at.is_some()
    }

    #[must_use]
    pub fn tag_titles(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.title.clone()).collect()
    }

    #[must_use]
    pub fn assignee_usernames(&self) -> Vec<String> {
        self.assignees.iter().map(|a| a.user.username.clone()).collect()
    }

    #[must_use]
    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.file_name.clone()).collect()
    }
}
