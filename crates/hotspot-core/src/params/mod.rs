//! The adaptive parameter tree.
//! Typed groups with per-group serde defaults; saved documents deep-merge
//! onto defaults at every depth when loaded.

pub mod access;
pub mod adaptive;
pub mod flatten;

pub use adaptive::{
    AdaptiveParameters, ColorClassification, ConfidenceFactors, GeometricRules, HsvWarm,
    Sensitivity, SeverityRules,
};
pub use flatten::flatten_numeric;
