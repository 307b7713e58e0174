//! Feedback event payload types.

pub mod types;

pub use types::{AppliedAdaptation, BboxChange, FeedbackEvent, SizeChange};
