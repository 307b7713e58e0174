//! Persistence layer: the adaptive parameter document, the append-only
//! feedback log, and the parameter change log (JSON plus a flattened CSV).
//!
//! All files are guarded by advisory locks so concurrent processes cannot
//! interleave writes. Unreadable state degrades to defaults with a warning;
//! failed writes leave the in-memory state authoritative.

pub mod change_log;
pub mod feedback_log;
pub mod json_file;
pub mod params_file;

pub use change_log::{ChangeTracker, DetectionCounts, FieldChange, ParameterChangeRecord};
pub use feedback_log::{FeedbackDocument, FeedbackEntry, FeedbackLog, FeedbackStatistics};
pub use params_file::ParameterStore;
