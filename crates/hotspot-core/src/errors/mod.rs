//! Error handling for Hotspot.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod feedback_error;
pub mod params_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use feedback_error::FeedbackError;
pub use params_error::ParamsError;
pub use storage_error::StorageError;
