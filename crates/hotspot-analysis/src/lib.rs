//! Analysis engine: warm-color mask construction, connected-component
//! region extraction, rule-based fault classification, and feedback
//! analysis with bounded parameter adaptation.
//!
//! Everything here is pure and stateless per call; persistence and mutation
//! serialization live in `hotspot-storage` and `hotspot-engine`.

pub mod classifier;
pub mod feedback;
pub mod hsv;
pub mod mask;
pub mod pipeline;
pub mod regions;

pub use pipeline::{classify, ClassificationOutcome};
