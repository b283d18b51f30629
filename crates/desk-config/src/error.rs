use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the config shape.
    #[error("Could not load helpdesk configuration: {0}")]
    Figment(#[from] figment::Error),

    /// Loaded fine but the values cannot run the engine.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
