//! # desk-core
//!
//! Core types, change ledger, and error types for the helpdesk task engine.
//!
//! This crate provides the foundational types shared across all helpdesk crates:
//! - Entity structs for the task aggregate and everything it references
//! - Enums for status functions, work types, attribute types and recipients
//! - ID prefix constants
//! - The change ledger (`ChangeValue`, `ChangeRecord`, `ChangeLedger`)
//! - Cross-cutting error taxonomy
//! - Response shapes handed back to the controller layer

pub mod changes;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
