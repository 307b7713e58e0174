//! End-to-end classification of one image.

use image::RgbImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use hotspot_core::params::AdaptiveParameters;
use hotspot_core::types::{Detection, ImageStatus};

use crate::classifier::classify_region;
use crate::mask::{build_warm_mask, sensitivity_threshold};
use crate::regions::extract_regions;

/// Result of classifying one image. Serializable, so it doubles as the
/// per-image annotation document handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub status: ImageStatus,
    pub detections: Vec<Detection>,
    /// The adaptive heatmap threshold (`mean + k·std`) for this run, absent
    /// when no heatmap was supplied. Reported as the run's sensitivity
    /// metric; region extraction is driven by the warm-color mask.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sensitivity_threshold: Option<f64>,
}

/// Classify one image: warm mask, artifact suppression, connected
/// components, rule-based labeling. Pure and safe to run concurrently
/// across independent images.
pub fn classify(
    image: &RgbImage,
    heatmap: Option<&Array2<f32>>,
    params: &AdaptiveParameters,
) -> ClassificationOutcome {
    let threshold = heatmap.map(|map| sensitivity_threshold(map, &params.sensitivity));

    let mask = build_warm_mask(image, params);
    let boxes = extract_regions(&mask, &params.sensitivity);
    let detections: Vec<Detection> = boxes
        .into_iter()
        .map(|bbox| classify_region(image, bbox, params))
        .collect();

    let status = if detections.is_empty() {
        ImageStatus::Normal
    } else {
        ImageStatus::Anomalies
    };

    ClassificationOutcome {
        status,
        detections,
        sensitivity_threshold: threshold,
    }
}
