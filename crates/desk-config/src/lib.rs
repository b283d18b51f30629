//! # desk-config
//!
//! Layered configuration loading for the helpdesk engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`HELPDESK_*` prefix, `__` as separator)
//! 2. Project-level `.helpdesk/config.toml`
//! 3. User-level `~/.config/helpdesk/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HELPDESK_MAIL__FROM` -> `mail.from`,
//! `HELPDESK_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use desk_config::DeskConfig;
//!
//! let config = DeskConfig::load_with_dotenv().expect("config");
//! if config.mail.is_configured() {
//!     println!("Sending as {}", config.mail.from);
//! }
//! ```

mod database;
mod error;
mod files;
mod mail;
mod tags;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use files::FilesConfig;
pub use mail::MailConfig;
pub use tags::TagsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub tags: TagsConfig,
}

impl DeskConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".helpdesk/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("HELPDESK_").split("__"));

        figment
    }

    /// Reject combinations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty sender address while
    /// mail is enabled, or an empty database path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mail.enabled && self.mail.from.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "mail.from".into(),
                reason: "must not be empty while mail.enabled is true".into(),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("helpdesk").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DeskConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.mail.is_configured());
        assert_eq!(config.tags.default_color, "#20b2aa");
        assert_eq!(config.files.upload_dir, ".helpdesk/uploads");
    }

    #[test]
    fn empty_sender_is_rejected_when_mail_enabled() {
        let mut config = DeskConfig::default();
        config.mail.from = String::new();
        let err = config.validate().expect_err("should reject");
        assert!(err.to_string().contains("mail.from"));

        config.mail.enabled = false;
        assert!(config.validate().is_ok());
    }
}
