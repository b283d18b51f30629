use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A helpdesk user. `name`/`surname` come from the optional detail record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub company_id: Option<String>,
}

impl User {
    /// `username (name surname)`, or just `username` without detail data.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.name.as_deref(), self.surname.as_deref()) {
            (Some(name), Some(surname)) => format!("{} ({name} {surname})", self.username),
            (Some(part), None) | (None, Some(part)) => format!("{} ({part})", self.username),
            (None, None) => self.username.clone(),
        }
    }
}
