//! Adaptive classification parameters.
//!
//! One process-wide tree, loaded at startup from the persisted JSON document
//! merged onto these defaults, nudged by the parameter adapter, and saved
//! after every mutation. Every struct is `#[serde(default)]`, so keys absent
//! from a saved document keep their default at any depth — saved files from
//! older schema versions load cleanly.

use serde::{Deserialize, Serialize};

/// Top-level parameter tree aggregating all groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParameters {
    pub sensitivity: Sensitivity,
    pub hsv_warm: HsvWarm,
    pub color_classification: ColorClassification,
    pub geometric_rules: GeometricRules,
    pub severity_rules: SeverityRules,
    pub confidence_factors: ConfidenceFactors,
}

/// Detection sensitivity: heatmap thresholding and minimum region size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    /// Sensitivity percentage, 0 (most sensitive) to 100 (least). Default: 50.
    pub percent_threshold: u32,
    /// Fraction of image area below which regions are discarded. Default: 0.001.
    pub min_area_factor: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            percent_threshold: 50,
            min_area_factor: 0.001,
        }
    }
}

impl Sensitivity {
    /// Adaptation ceiling/floor for `percent_threshold`.
    pub const PERCENT_THRESHOLD_MAX: u32 = 90;
    pub const PERCENT_THRESHOLD_MIN: u32 = 10;
    /// Adaptation ceiling/floor for `min_area_factor`.
    pub const MIN_AREA_FACTOR_MAX: f64 = 0.005;
    pub const MIN_AREA_FACTOR_MIN: f64 = 0.0005;

    /// Map `percent_threshold` (clamped to 0–100) linearly onto the heatmap
    /// threshold multiplier k ∈ [1.1, 2.1].
    pub fn adaptive_k(&self) -> f64 {
        let percent = self.percent_threshold.min(100) as f64;
        1.1 + (percent / 100.0) * 1.0
    }

    /// Minimum connected-component pixel area for an image of the given size:
    /// `max(32, ⌊width·height·min_area_factor⌋)`.
    pub fn min_region_area(&self, width: u32, height: u32) -> u64 {
        let scaled = (width as f64 * height as f64 * self.min_area_factor) as u64;
        scaled.max(32)
    }
}

/// Warm-pixel HSV gates, normalized to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsvWarm {
    /// Warm hue wraps around red: hue ≤ hue_low or hue ≥ hue_high.
    pub hue_low: f64,
    pub hue_high: f64,
    pub saturation_min: f64,
    pub value_min: f64,
}

impl Default for HsvWarm {
    fn default() -> Self {
        Self {
            hue_low: 0.17,
            hue_high: 0.95,
            saturation_min: 0.35,
            value_min: 0.5,
        }
    }
}

/// Red/orange/yellow band thresholds on the OpenCV HSV scale
/// (H 0–180, S and V 0–255).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorClassification {
    /// Red wraps: H ≤ red_hue_max or H ≥ red_hue_min.
    pub red_hue_max: f64,
    pub red_hue_min: f64,
    /// Orange band: red_hue_max < H ≤ orange_hue_max (half-open).
    pub orange_hue_min: f64,
    pub orange_hue_max: f64,
    /// Yellow band: orange_hue_max < H ≤ yellow_hue_max (half-open).
    pub yellow_hue_min: f64,
    pub yellow_hue_max: f64,
    pub color_sat_min: f64,
    pub color_val_min: f64,
}

impl Default for ColorClassification {
    fn default() -> Self {
        Self {
            red_hue_max: 10.0,
            red_hue_min: 160.0,
            orange_hue_min: 10.0,
            orange_hue_max: 25.0,
            yellow_hue_min: 25.0,
            yellow_hue_max: 35.0,
            color_sat_min: 100.0,
            color_val_min: 100.0,
        }
    }
}

/// Geometric classification rules over bounding-box fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricRules {
    pub loose_joint_area_min: f64,
    pub loose_joint_overlap_min: f64,
    pub loose_joint_large_area: f64,
    pub wire_aspect_ratio: f64,
    pub wire_overload_area: f64,
}

impl Default for GeometricRules {
    fn default() -> Self {
        Self {
            loose_joint_area_min: 0.10,
            loose_joint_overlap_min: 0.4,
            loose_joint_large_area: 0.30,
            wire_aspect_ratio: 2.0,
            wire_overload_area: 0.30,
        }
    }
}

impl GeometricRules {
    /// Adaptation bounds for `loose_joint_area_min`.
    pub const LOOSE_JOINT_AREA_MAX: f64 = 0.20;
    pub const LOOSE_JOINT_AREA_MIN: f64 = 0.05;
}

/// Severity classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityRules {
    /// Red+orange share of warm pixels at or above which a region is Faulty.
    pub faulty_red_orange_threshold: f64,
}

impl Default for SeverityRules {
    fn default() -> Self {
        Self {
            faulty_red_orange_threshold: 0.5,
        }
    }
}

impl SeverityRules {
    /// Adaptation bounds for `faulty_red_orange_threshold`.
    pub const FAULTY_THRESHOLD_MAX: f64 = 0.8;
    pub const FAULTY_THRESHOLD_MIN: f64 = 0.2;
}

/// Confidence formula coefficients per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceFactors {
    pub loose_joint_base: f64,
    pub loose_joint_area_factor: f64,
    pub wire_base: f64,
    pub wire_aspect_factor: f64,
    pub point_base: f64,
    pub point_brightness_factor: f64,
}

impl Default for ConfidenceFactors {
    fn default() -> Self {
        Self {
            loose_joint_base: 0.6,
            loose_joint_area_factor: 0.8,
            wire_base: 0.5,
            wire_aspect_factor: 0.2,
            point_base: 0.5,
            point_brightness_factor: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_k_endpoints() {
        let mut s = Sensitivity::default();
        s.percent_threshold = 0;
        assert!((s.adaptive_k() - 1.1).abs() < 1e-12);
        s.percent_threshold = 100;
        assert!((s.adaptive_k() - 2.1).abs() < 1e-12);
        // Out-of-range values clamp rather than extrapolate.
        s.percent_threshold = 250;
        assert!((s.adaptive_k() - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_min_region_area_floor() {
        let s = Sensitivity::default();
        // 100x100 at factor 0.001 gives 10 pixels, floored to 32.
        assert_eq!(s.min_region_area(100, 100), 32);
        assert_eq!(s.min_region_area(1000, 1000), 1000);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let params: AdaptiveParameters =
            serde_json::from_str(r#"{"sensitivity": {"percent_threshold": 75}}"#).unwrap();
        assert_eq!(params.sensitivity.percent_threshold, 75);
        // Sibling leaf in the same group keeps its default.
        assert!((params.sensitivity.min_area_factor - 0.001).abs() < 1e-12);
        // Untouched groups keep theirs.
        assert!((params.geometric_rules.wire_aspect_ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let params: AdaptiveParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(params, AdaptiveParameters::default());
    }
}
