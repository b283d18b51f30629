//! Repository modules implementing lookups and writes for every helpdesk entity.
//!
//! Each module adds methods to `DeskService` via `impl DeskService` blocks.
//! Lookups by id are `find_*` and return `Ok(None)` for a missing row.

pub mod attribute;
pub mod company;
pub mod file;
pub mod notification;
pub mod project;
pub mod status;
pub mod tag;
pub mod task;
pub mod user;
