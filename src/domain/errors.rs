//! Domain error types
//!
//! Every failure a section derivation can raise is represented here. Errors
//! name the configuration key or file that caused them so operators can fix
//! the deployment without reading the code.

use std::path::PathBuf;
use thiserror::Error;

/// Main service configuration error type
#[derive(Debug, Error)]
pub enum ServiceConfigError {
    /// A config path has no value and the section defines no default for it
    #[error("service config is missing required property \"{key}\"")]
    MissingRequiredKey { key: String },

    /// A config path has a value that cannot be converted to the expected type
    #[error("service config property \"{key}\" is invalid: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The package manifest has no name field
    #[error("package manifest {} is missing the \"name\" field", .path.display())]
    MissingManifestName { path: PathBuf },

    /// The package manifest could not be read or parsed
    #[error("failed to read package manifest {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    /// The public key file could not be read
    #[error("missing public key: {}", .path.display())]
    MissingPublicKey { path: PathBuf },

    /// The log file could not be opened
    #[error("failed to open log destination {}: {reason}", .path.display())]
    LogDestination { path: PathBuf, reason: String },

    /// The layered configuration source could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tracing subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl ServiceConfigError {
    /// Shorthand for [`ServiceConfigError::MissingRequiredKey`]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequiredKey { key: key.into() }
    }
}

impl From<config::ConfigError> for ServiceConfigError {
    fn from(err: config::ConfigError) -> Self {
        ServiceConfigError::Configuration(err.to_string())
    }
}
