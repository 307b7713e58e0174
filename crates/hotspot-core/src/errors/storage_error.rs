//! Persistence errors.

/// Errors from the durable parameter/log files.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Could not parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Could not lock {path}: {message}")]
    Lock { path: String, message: String },

    #[error("Export failed: {message}")]
    Export { message: String },
}
