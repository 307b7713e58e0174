//! The Hotspot inspection engine.
//!
//! Transport-agnostic facade over the classification pipeline and the
//! feedback-driven parameter adaptation loop. Embedders (HTTP handlers,
//! batch jobs, desktop shells) construct one [`InspectionEngine`] per data
//! directory and call its operations; all parameter mutation is serialized
//! internally.

pub mod engine;
pub mod observability;

pub use engine::{ExportFormat, FeedbackOutcome, InspectionEngine, OutcomeStatus};
pub use hotspot_analysis::ClassificationOutcome;
pub use hotspot_core::config::EngineConfig;
pub use hotspot_core::params::AdaptiveParameters;
pub use hotspot_core::types::{BoundingBox, Detection, FaultCategory, ImageStatus, Severity};
pub use hotspot_storage::FeedbackStatistics;
