//! Rule-based fault classification of candidate regions.
//!
//! Feature extraction (geometry and warm-color composition of a bounding
//! box) is separated from the decision rules so the rules stay a pure
//! function of features and parameters.

use image::RgbImage;

use hotspot_core::params::AdaptiveParameters;
use hotspot_core::types::{BoundingBox, Detection, FaultCategory, Severity};

use crate::hsv::rgb_to_hsv;

/// Central region of the image used for the loose-joint overlap rule,
/// spanning 33%–67% of each axis.
const CENTER_LOW: f64 = 0.33;
const CENTER_HIGH: f64 = 0.67;

/// Measured features of one candidate region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeatures {
    /// Box area as a fraction of image area.
    pub area_frac: f64,
    /// Long side over short side, at least 1.
    pub aspect: f64,
    /// Fraction of the box overlapping the image center region.
    pub overlap_frac: f64,
    /// Red+orange share of the box's warm pixels (0 when none are warm).
    pub red_orange_frac: f64,
    /// Yellow share of the box's warm pixels.
    pub yellow_frac: f64,
    /// Mean normalized brightness over the box.
    pub v_mean: f64,
}

/// Measure geometry and color composition for a bounding box.
pub fn extract_features(
    image: &RgbImage,
    bbox: &BoundingBox,
    params: &AdaptiveParameters,
) -> RegionFeatures {
    let (width, height) = image.dimensions();
    let total_area = (width as f64) * (height as f64);
    let box_area = bbox.area() as f64;

    let area_frac = if total_area > 0.0 {
        box_area / total_area
    } else {
        0.0
    };
    let long = bbox.width.max(bbox.height) as f64;
    let short = bbox.width.min(bbox.height).max(1) as f64;
    let aspect = long / short;

    let cx0 = (width as f64 * CENTER_LOW) as u32;
    let cy0 = (height as f64 * CENTER_LOW) as u32;
    let cx1 = (width as f64 * CENTER_HIGH) as u32;
    let cy1 = (height as f64 * CENTER_HIGH) as u32;
    let center = BoundingBox::new(cx0, cy0, cx1.saturating_sub(cx0), cy1.saturating_sub(cy0));
    let overlap_frac = if box_area > 0.0 {
        bbox.intersection_area(&center) as f64 / box_area
    } else {
        0.0
    };

    let colors = &params.color_classification;
    let mut red_orange = 0u64;
    let mut yellow = 0u64;
    let mut warm = 0u64;
    let mut v_sum = 0.0;
    let mut pixels = 0u64;

    let x_end = bbox.x.saturating_add(bbox.width).min(width);
    let y_end = bbox.y.saturating_add(bbox.height).min(height);
    for y in bbox.y..y_end {
        for x in bbox.x..x_end {
            let [r, g, b] = image.get_pixel(x, y).0;
            let px = rgb_to_hsv(r, g, b);
            let (h, s, v) = (px.h as f64, px.s as f64, px.v as f64);
            v_sum += v / 255.0;
            pixels += 1;

            if s < colors.color_sat_min || v < colors.color_val_min {
                continue;
            }
            let is_red = h <= colors.red_hue_max || h >= colors.red_hue_min;
            let is_orange = h > colors.orange_hue_min && h <= colors.orange_hue_max;
            let is_yellow = h > colors.yellow_hue_min && h <= colors.yellow_hue_max;
            if is_red || is_orange {
                red_orange += 1;
                warm += 1;
            } else if is_yellow {
                yellow += 1;
                warm += 1;
            }
        }
    }

    let (red_orange_frac, yellow_frac) = if warm > 0 {
        (red_orange as f64 / warm as f64, yellow as f64 / warm as f64)
    } else {
        (0.0, 0.0)
    };
    let v_mean = if pixels > 0 {
        v_sum / pixels as f64
    } else {
        0.0
    };

    RegionFeatures {
        area_frac,
        aspect,
        overlap_frac,
        red_orange_frac,
        yellow_frac,
        v_mean,
    }
}

/// Apply the decision rules, first match wins. Returns category, severity,
/// and confidence.
pub fn decide(
    features: &RegionFeatures,
    params: &AdaptiveParameters,
) -> (FaultCategory, Severity, f64) {
    let geo = &params.geometric_rules;
    let conf = &params.confidence_factors;

    let severity_by_color =
        if features.red_orange_frac >= params.severity_rules.faulty_red_orange_threshold {
            Severity::Faulty
        } else {
            Severity::PotentiallyFaulty
        };

    if features.area_frac >= geo.loose_joint_area_min
        && (features.overlap_frac >= geo.loose_joint_overlap_min
            || features.area_frac >= geo.loose_joint_large_area)
    {
        let confidence =
            (conf.loose_joint_base + conf.loose_joint_area_factor * features.area_frac).min(1.0);
        return (FaultCategory::LooseJoint, severity_by_color, confidence);
    }

    if features.aspect >= geo.wire_aspect_ratio {
        let confidence = (conf.wire_base + conf.wire_aspect_factor * features.aspect).min(1.0);
        if features.area_frac >= geo.wire_overload_area
            && features.yellow_frac >= features.red_orange_frac
        {
            // A sustained overload along a conductor never escalates past
            // PotentiallyFaulty on color alone.
            return (
                FaultCategory::WireOverload,
                Severity::PotentiallyFaulty,
                confidence,
            );
        }
        return (FaultCategory::PointOverload, severity_by_color, confidence);
    }

    let confidence = (conf.point_base + conf.point_brightness_factor * features.v_mean).min(1.0);
    (FaultCategory::PointOverload, severity_by_color, confidence)
}

/// Classify one candidate region into a labeled detection.
pub fn classify_region(
    image: &RgbImage,
    bbox: BoundingBox,
    params: &AdaptiveParameters,
) -> Detection {
    let features = extract_features(image, &bbox, params);
    let (category, severity, confidence) = decide(&features, params);
    Detection::new(category, severity, confidence, bbox)
}
