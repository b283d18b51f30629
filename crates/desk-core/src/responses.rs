//! Response shapes returned to the controller layer after a task mutation.

use serde::{Serialize, Serializer};

use crate::changes::ChangeLedger;
use crate::entities::Task;

/// Outcome of the email dispatch for one mutation.
///
/// Serializes as `{"error": false | "<message>", "sentEmails": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    #[serde(serialize_with = "error_or_false")]
    pub error: Option<String>,
    pub sent_emails: Vec<String>,
}

impl NotificationOutcome {
    /// Fold another outcome into this one. The first error message wins.
    pub fn merge(&mut self, other: Self) {
        if self.error.is_none() {
            self.error = other.error;
        }
        for email in other.sent_emails {
            if !self.sent_emails.contains(&email) {
                self.sent_emails.push(email);
            }
        }
    }
}

fn error_or_false<S: Serializer>(error: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(message) => serializer.serialize_str(message),
        None => serializer.serialize_bool(false),
    }
}

/// Everything a create/update hands back: the mutated aggregate, the change
/// ledger, and the email outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMutationResponse {
    pub task: Task,
    pub changes: ChangeLedger,
    pub notifications: NotificationOutcome,
}
