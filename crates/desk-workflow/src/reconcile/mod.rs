//! Relation reconciler.
//!
//! Set-valued relations are replaced wholesale: the old member list is
//! captured for the ledger, the relation is cleared, and the target list from
//! the patch is resolved and re-added. Custom task data is keyed by attribute
//! and only touches the keys present in the patch.

mod assignees;
mod attachments;
mod tags;
mod task_data;
