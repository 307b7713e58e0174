//! Typed feedback events.
//!
//! One event describes one discrepancy between a machine detection set and
//! its human-corrected counterpart. Events are persisted verbatim inside
//! feedback log entries, so the wire shape is part of the storage contract.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Detection, FaultCategory, Severity};

/// How a corrected bounding box differs from the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeChange {
    Smaller,
    Larger,
    Moved,
}

impl SizeChange {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Smaller => "smaller",
            Self::Larger => "larger",
            Self::Moved => "moved",
        }
    }
}

/// Measured bounding-box change for a matched detection pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboxChange {
    /// corrected_area / original_area.
    pub area_ratio: f64,
    pub original_area: u64,
    pub corrected_area: u64,
    pub size_change: SizeChange,
    /// Manhattan displacement of the box center, set for `Moved` changes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position_change: Option<f64>,
}

/// One discrepancy between original and corrected detection sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// A machine detection the reviewer deleted.
    FalsePositive { deleted: Detection },
    /// A region the reviewer added that the machine missed.
    FalseNegative { added: Detection },
    /// A matched pair whose bounding box was resized or moved.
    BboxResize {
        category: FaultCategory,
        change: BboxChange,
        original: BoundingBox,
        corrected: BoundingBox,
    },
    /// A matched pair whose severity was corrected.
    SeverityChange {
        category: FaultCategory,
        from: Severity,
        to: Severity,
    },
    /// A matched pair whose category was corrected.
    CategoryChange {
        from: FaultCategory,
        to: FaultCategory,
        bbox: BoundingBox,
    },
}

impl FeedbackEvent {
    /// Snake_case event name, used in statistics, CSV export, and the
    /// adaptations-applied listing.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FalsePositive { .. } => "false_positive",
            Self::FalseNegative { .. } => "false_negative",
            Self::BboxResize { .. } => "bbox_resize",
            Self::SeverityChange { .. } => "severity_change",
            Self::CategoryChange { .. } => "category_change",
        }
    }
}

/// One bounded parameter mutation applied in response to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdaptation {
    /// Dotted path of the mutated leaf, e.g. `sensitivity.percent_threshold`.
    pub field: String,
    pub from: f64,
    pub to: f64,
}
