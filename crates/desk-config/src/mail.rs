//! Outgoing email settings.

use serde::{Deserialize, Serialize};

fn default_from() -> String {
    String::from("helpdesk@localhost")
}

fn default_outbox_dir() -> String {
    String::from(".helpdesk/outbox")
}

fn default_subject_prefix() -> String {
    String::from("[Helpdesk]")
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// When false, no email is dispatched and notifications are in-app only.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sender address for every notification email.
    #[serde(default = "default_from")]
    pub from: String,

    /// Directory the outbox mailer appends JSON lines to.
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,

    /// Optional directory with `<template>.html` overrides.
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Appended to the "contact the administrator" message on send failures.
    #[serde(default)]
    pub admin_contact: String,

    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            from: default_from(),
            outbox_dir: default_outbox_dir(),
            template_dir: None,
            admin_contact: String::new(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

impl MailConfig {
    /// Whether emails should actually be dispatched.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.from.is_empty()
    }
}
