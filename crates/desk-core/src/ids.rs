//! ID prefixes for every persisted entity.
//!
//! IDs are generated by the database layer as `{prefix}-{8 hex chars}`.

pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_STATUS: &str = "sts";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_COMPANY: &str = "cmp";
pub const PREFIX_TAG: &str = "tag";
pub const PREFIX_ATTRIBUTE: &str = "atr";
pub const PREFIX_FILE: &str = "fil";
pub const PREFIX_NOTIFICATION: &str = "ntf";

/// Every prefix in use.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_TASK,
    PREFIX_STATUS,
    PREFIX_USER,
    PREFIX_PROJECT,
    PREFIX_COMPANY,
    PREFIX_TAG,
    PREFIX_ATTRIBUTE,
    PREFIX_FILE,
    PREFIX_NOTIFICATION,
];
