//! Configuration errors.

/// Errors from loading or validating the engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid config value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
