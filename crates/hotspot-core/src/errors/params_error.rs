//! Adaptive parameter tree errors.

/// Errors raised when addressing or mutating the parameter tree.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Unknown parameter category: {name}")]
    UnknownCategory { name: String },

    #[error("Unknown parameter {category}.{name}")]
    UnknownField { category: String, name: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Parameter serialization failed: {message}")]
    Serialize { message: String },
}
