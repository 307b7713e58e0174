//! Detections and their building blocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel area of the box.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center point of the box.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersection area with another box, in pixels.
    pub fn intersection_area(&self, other: &BoundingBox) -> u64 {
        let x0 = self.x.max(other.x) as i64;
        let y0 = self.y.max(other.y) as i64;
        let x1 = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);
        ((x1 - x0).max(0) * (y1 - y0).max(0)) as u64
    }
}

/// Fault categories assigned by the region classifier.
///
/// `Unknown` exists only as the substitution target for missing or
/// unrecognized categories in externally supplied detections; the classifier
/// never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    LooseJoint,
    WireOverload,
    PointOverload,
    #[serde(other)]
    Unknown,
}

impl FaultCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LooseJoint => "loose_joint",
            Self::WireOverload => "wire_overload",
            Self::PointOverload => "point_overload",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label used on rendered overlays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LooseJoint => "Loose Joint",
            Self::WireOverload => "Full Wire Overload",
            Self::PointOverload => "Point Overload",
            Self::Unknown => "Anomaly",
        }
    }
}

impl Default for FaultCategory {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fault severity. Wire names match what inspection frontends exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Faulty,
    #[serde(rename = "Potentially Faulty")]
    PotentiallyFaulty,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Faulty => "Faulty",
            Self::PotentiallyFaulty => "Potentially Faulty",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::PotentiallyFaulty
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overall status of a classified image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageStatus {
    Normal,
    Anomalies,
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("Normal"),
            Self::Anomalies => f.write_str("Anomalies"),
        }
    }
}

/// A labeled fault region. Produced by the classifier or supplied externally
/// as a human correction; immutable once produced.
///
/// External payloads may omit fields: category falls back to `Unknown`,
/// severity to `Potentially Faulty`, confidence to 0.5, and the bbox to the
/// zero box (which ratio-based comparisons then skip). Malformed input is
/// never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
    pub category: FaultCategory,
    pub severity: Severity,
    pub confidence: f64,
    pub bbox: BoundingBox,
    /// Region added by a human reviewer rather than the classifier.
    pub user_added: bool,
    /// Region geometry or labels edited by a human reviewer.
    pub edited: bool,
}

impl Default for Detection {
    fn default() -> Self {
        Self {
            category: FaultCategory::Unknown,
            severity: Severity::PotentiallyFaulty,
            confidence: 0.5,
            bbox: BoundingBox::default(),
            user_added: false,
            edited: false,
        }
    }
}

impl Detection {
    pub fn new(
        category: FaultCategory,
        severity: Severity,
        confidence: f64,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            category,
            severity,
            confidence,
            bbox,
            user_added: false,
            edited: false,
        }
    }
}
