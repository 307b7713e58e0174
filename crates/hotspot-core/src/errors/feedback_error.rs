//! Feedback processing errors.
//! Aggregates subsystem errors via `From` conversions.

use super::{ParamsError, StorageError};

/// Errors that can occur while analyzing or applying a feedback batch.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Parameter error: {0}")]
    Params(#[from] ParamsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid detection payload: {message}")]
    InvalidDetection { message: String },
}
