//! Status functions, work types, attribute types, and recipient roles.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! except `NotificationKind`, whose stored value is the upper-case `"TASK"`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StatusFunction
// ---------------------------------------------------------------------------

/// Coarse lifecycle category attached to every `Status`.
///
/// ```text
/// new → in_progress → completed → closed
/// ```
///
/// The function, not the status title, drives the task invariants: `closed`
/// requires `closed_at`, `in_progress` and `completed` stamp `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusFunction {
    New,
    InProgress,
    Completed,
    Closed,
}

impl StatusFunction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Closed => "closed",
        }
    }

    /// Whether a task in this state must carry a `closed_at` timestamp.
    #[must_use]
    pub const fn requires_closed_at(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether entering this state marks the work as started.
    #[must_use]
    pub const fn starts_work(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl fmt::Display for StatusFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkType
// ---------------------------------------------------------------------------

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    RemoteSupport,
    ItService,
    ServerService,
    WebProgramming,
    ClientInstallation,
    BugReport,
    Design,
    Material,
    PriceOffer,
    Administration,
    Consultation,
    Reinvoicing,
    Testing,
}

impl WorkType {
    pub const ALL: &'static [Self] = &[
        Self::RemoteSupport,
        Self::ItService,
        Self::ServerService,
        Self::WebProgramming,
        Self::ClientInstallation,
        Self::BugReport,
        Self::Design,
        Self::Material,
        Self::PriceOffer,
        Self::Administration,
        Self::Consultation,
        Self::Reinvoicing,
        Self::Testing,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoteSupport => "remote_support",
            Self::ItService => "it_service",
            Self::ServerService => "server_service",
            Self::WebProgramming => "web_programming",
            Self::ClientInstallation => "client_installation",
            Self::BugReport => "bug_report",
            Self::Design => "design",
            Self::Material => "material",
            Self::PriceOffer => "price_offer",
            Self::Administration => "administration",
            Self::Consultation => "consultation",
            Self::Reinvoicing => "reinvoicing",
            Self::Testing => "testing",
        }
    }

    /// Parse the stored/wire form. Hyphens are accepted in place of underscores.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.as_str().eq_ignore_ascii_case(&normalized))
    }

    /// Comma-separated list of allowed values, used in validation messages.
    #[must_use]
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AttributeType
// ---------------------------------------------------------------------------

/// Declared type of a custom task attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Input,
    Textarea,
    Select,
    Multiselect,
    Date,
    Integer,
    Decimal,
    Checkbox,
}

impl AttributeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// Category of a persisted notification. Only task notifications exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Task,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "TASK",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecipientRole
// ---------------------------------------------------------------------------

/// Which notification group a recipient belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    OldRequester,
    NewRequester,
    OldAssigners,
    NewAssigners,
    General,
}

impl RecipientRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OldRequester => "old_requester",
            Self::NewRequester => "new_requester",
            Self::OldAssigners => "old_assigners",
            Self::NewAssigners => "new_assigners",
            Self::General => "general",
        }
    }
}

impl fmt::Display for RecipientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in lookup errors and ID generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Task,
    Status,
    User,
    Project,
    Company,
    Tag,
    TaskAttribute,
    File,
    Notification,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Status => "status",
            Self::User => "user",
            Self::Project => "project",
            Self::Company => "company",
            Self::Tag => "tag",
            Self::TaskAttribute => "task_attribute",
            Self::File => "file",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
