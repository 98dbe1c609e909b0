//! # Fabric Step Configuration
//!
//! Everything the build step reads from disk:
//!
//! - [`settings`]: the process-wide default fabric executable, persisted as
//!   YAML and changed only through an explicit save.
//! - [`job`]: per-job field records (fabfile, command, user, host, role).
//! - [`validation`]: the field validators shown next to a job's inputs.

#![warn(missing_docs)]

use thiserror::Error;

pub mod job;
pub mod settings;
pub mod validation;

pub use job::JobDefinition;
pub use settings::{FabricSettings, GlobalSettings, SettingsStore};
pub use validation::{FormValidation, validate_command, validate_fabfile};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write configuration file
    #[error("Failed to write config file {path}: {source}")]
    WriteError {
        /// File that could not be written
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or emit YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
