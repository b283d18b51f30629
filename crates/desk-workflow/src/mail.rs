//! Email transport seam and the JSONL outbox implementation.
//!
//! The engine hands one [`EmailMessage`] per recipient group to a [`Mailer`]
//! and only cares which addresses were accepted. `OutboxMailer` appends each
//! message to `{outbox_dir}/outbox.jsonl` via `serde_jsonlines`, for a
//! separate delivery process to pick up.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Per-address result of one send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

impl SendOutcome {
    #[must_use]
    pub fn all_sent(to: &[String]) -> Self {
        Self {
            sent: to.to_vec(),
            failed: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Outbox I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport failed: {0}")]
    Transport(String),
}

pub trait Mailer: Send + Sync {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns `MailError` when nothing could be handed to the transport.
    fn send(&self, message: &EmailMessage) -> Result<SendOutcome, MailError>;
}

/// One queued message as stored in the outbox file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub queued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: EmailMessage,
}

/// Appends outgoing mail to a JSONL outbox file.
pub struct OutboxMailer {
    outbox_dir: PathBuf,
    enabled: bool,
}

impl OutboxMailer {
    pub const FILE_NAME: &'static str = "outbox.jsonl";

    /// Create a mailer writing into `outbox_dir`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `MailError::Io` if the directory cannot be created.
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Result<Self, MailError> {
        let outbox_dir = outbox_dir.into();
        std::fs::create_dir_all(&outbox_dir)?;
        Ok(Self {
            outbox_dir,
            enabled: true,
        })
    }

    /// A mailer that accepts nothing and reports no recipients as sent.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            outbox_dir: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub fn outbox_path(&self) -> PathBuf {
        self.outbox_dir.join(Self::FILE_NAME)
    }

    #[must_use]
    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }

    /// Every message queued so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MailError::Io` if the outbox cannot be read or parsed.
    pub fn queued(&self) -> Result<Vec<OutboxEntry>, MailError> {
        let path = self.outbox_path();
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        let entries = serde_jsonlines::json_lines(&path)?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &EmailMessage) -> Result<SendOutcome, MailError> {
        if !self.enabled {
            return Ok(SendOutcome::default());
        }
        let entry = OutboxEntry {
            queued_at: Utc::now(),
            message: message.clone(),
        };
        serde_jsonlines::append_json_lines(self.outbox_path(), [&entry])?;
        Ok(SendOutcome::all_sent(&message.to))
    }
}
