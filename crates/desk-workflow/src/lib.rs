//! # desk-workflow
//!
//! Task mutation and change-notification engine for the helpdesk.
//!
//! - Field validation and typed patch parsing (`validate`, `patch`)
//! - Patch application and relation reconciliation, building a change ledger
//! - Notification routing from the ledger (`notify`)
//! - Email dispatch per recipient group (`dispatch`)
//! - Collaborator seams: access policy, file store, mailer, templates
//!
//! [`TaskWorkflow`] ties these together for create and update.

pub mod access;
mod apply;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod files;
pub mod mail;
pub mod notify;
pub mod patch;
mod reconcile;
pub mod templates;
pub mod validate;

pub use engine::{TaskWorkflow, WorkflowSettings};
pub use error::WorkflowError;
pub use patch::TaskPatch;
