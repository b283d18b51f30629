//! Entity structs for the task aggregate and everything it references.
//!
//! Each entity maps to a table in the libSQL database (see `desk-db`
//! migrations). All structs derive `Serialize`, `Deserialize`, and `JsonSchema`
//! for JSON roundtrip and schema validation.

mod assignee;
mod attachment;
mod company;
mod notification;
mod project;
mod status;
mod tag;
mod task;
mod task_attribute;
mod user;

pub use assignee::Assignee;
pub use attachment::{Attachment, FileMeta};
pub use company::Company;
pub use notification::Notification;
pub use project::Project;
pub use status::Status;
pub use tag::Tag;
pub use task::Task;
pub use task_attribute::{TaskAttribute, TaskData, TaskDataValue};
pub use user::User;
