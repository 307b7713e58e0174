//! Shared detection types.

pub mod detection;

pub use detection::{BoundingBox, Detection, FaultCategory, ImageStatus, Severity};
