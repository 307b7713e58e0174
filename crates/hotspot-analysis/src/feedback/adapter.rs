//! Bounded parameter adaptation from feedback events.
//!
//! Each event maps to at most a couple of clamped nudges. Events in a batch
//! apply sequentially in analyzer order, so clamps compound across events.

use tracing::debug;

use hotspot_core::events::{AppliedAdaptation, FeedbackEvent};
use hotspot_core::params::{AdaptiveParameters, GeometricRules, Sensitivity, SeverityRules};
use hotspot_core::types::{FaultCategory, Severity};

/// Step applied to `percent_threshold` per false positive/negative.
const THRESHOLD_STEP: u32 = 3;
/// Multiplicative step applied to `min_area_factor`.
const AREA_FACTOR_GROWTH: f64 = 1.2;
const AREA_FACTOR_DECAY: f64 = 0.8;
/// Multiplicative step applied to `loose_joint_area_min` on resize feedback.
const LOOSE_JOINT_AREA_GROWTH: f64 = 1.1;
const LOOSE_JOINT_AREA_DECAY: f64 = 0.9;
/// Band of area ratios treated as "no meaningful resize".
const RATIO_SHRUNK: f64 = 0.8;
const RATIO_GROWN: f64 = 1.2;
/// Step applied to `faulty_red_orange_threshold` per severity correction.
const SEVERITY_STEP: f64 = 0.05;

/// Apply one event's mutations to the parameter tree. Returns a record of
/// each leaf that actually changed.
pub fn apply(params: &mut AdaptiveParameters, event: &FeedbackEvent) -> Vec<AppliedAdaptation> {
    let mut applied = Vec::new();

    match event {
        FeedbackEvent::FalsePositive { .. } => {
            reduce_sensitivity(params, &mut applied);
        }
        FeedbackEvent::FalseNegative { .. } => {
            increase_sensitivity(params, &mut applied);
        }
        FeedbackEvent::BboxResize {
            category, change, ..
        } => {
            if *category == FaultCategory::LooseJoint {
                adapt_loose_joint_area(params, change.area_ratio, &mut applied);
            }
        }
        FeedbackEvent::SeverityChange { from, to, .. } => {
            adapt_severity_threshold(params, *from, *to, &mut applied);
        }
        FeedbackEvent::CategoryChange { from, to, .. } => {
            // Recorded for later rule mining, no mutation derived yet.
            debug!(from = from.name(), to = to.name(), "category correction logged");
        }
    }

    for change in &applied {
        debug!(
            field = change.field.as_str(),
            from = change.from,
            to = change.to,
            "parameter adapted"
        );
    }
    applied
}

/// False positive: raise the threshold and the minimum region size.
fn reduce_sensitivity(params: &mut AdaptiveParameters, applied: &mut Vec<AppliedAdaptation>) {
    let s = &mut params.sensitivity;

    let from = s.percent_threshold;
    s.percent_threshold = (from + THRESHOLD_STEP).min(Sensitivity::PERCENT_THRESHOLD_MAX);
    record(applied, "sensitivity.percent_threshold", from as f64, s.percent_threshold as f64);

    let from = s.min_area_factor;
    s.min_area_factor = (from * AREA_FACTOR_GROWTH).min(Sensitivity::MIN_AREA_FACTOR_MAX);
    record(applied, "sensitivity.min_area_factor", from, s.min_area_factor);
}

/// False negative: lower the threshold and the minimum region size.
fn increase_sensitivity(params: &mut AdaptiveParameters, applied: &mut Vec<AppliedAdaptation>) {
    let s = &mut params.sensitivity;

    let from = s.percent_threshold;
    s.percent_threshold = from
        .saturating_sub(THRESHOLD_STEP)
        .max(Sensitivity::PERCENT_THRESHOLD_MIN);
    record(applied, "sensitivity.percent_threshold", from as f64, s.percent_threshold as f64);

    let from = s.min_area_factor;
    s.min_area_factor = (from * AREA_FACTOR_DECAY).max(Sensitivity::MIN_AREA_FACTOR_MIN);
    record(applied, "sensitivity.min_area_factor", from, s.min_area_factor);
}

/// Loose-joint boxes resized by the reviewer move the area requirement:
/// shrunk boxes tighten it, grown boxes relax it. Ratios inside
/// [RATIO_SHRUNK, RATIO_GROWN] (including pure moves) change nothing.
fn adapt_loose_joint_area(
    params: &mut AdaptiveParameters,
    area_ratio: f64,
    applied: &mut Vec<AppliedAdaptation>,
) {
    let geo = &mut params.geometric_rules;
    let from = geo.loose_joint_area_min;
    if area_ratio < RATIO_SHRUNK {
        geo.loose_joint_area_min =
            (from * LOOSE_JOINT_AREA_GROWTH).min(GeometricRules::LOOSE_JOINT_AREA_MAX);
    } else if area_ratio > RATIO_GROWN {
        geo.loose_joint_area_min =
            (from * LOOSE_JOINT_AREA_DECAY).max(GeometricRules::LOOSE_JOINT_AREA_MIN);
    } else {
        return;
    }
    record(applied, "geometric_rules.loose_joint_area_min", from, geo.loose_joint_area_min);
}

/// Severity downgrades mean the Faulty call was too eager, upgrades mean it
/// was too timid; the red/orange threshold moves accordingly.
fn adapt_severity_threshold(
    params: &mut AdaptiveParameters,
    from_severity: Severity,
    to_severity: Severity,
    applied: &mut Vec<AppliedAdaptation>,
) {
    let rules = &mut params.severity_rules;
    let from = rules.faulty_red_orange_threshold;
    match (from_severity, to_severity) {
        (Severity::Faulty, Severity::PotentiallyFaulty) => {
            rules.faulty_red_orange_threshold =
                (from + SEVERITY_STEP).min(SeverityRules::FAULTY_THRESHOLD_MAX);
        }
        (Severity::PotentiallyFaulty, Severity::Faulty) => {
            rules.faulty_red_orange_threshold =
                (from - SEVERITY_STEP).max(SeverityRules::FAULTY_THRESHOLD_MIN);
        }
        _ => return,
    }
    record(applied, "severity_rules.faulty_red_orange_threshold", from, rules.faulty_red_orange_threshold);
}

fn record(applied: &mut Vec<AppliedAdaptation>, field: &str, from: f64, to: f64) {
    if (from - to).abs() > f64::EPSILON {
        applied.push(AppliedAdaptation {
            field: field.to_string(),
            from,
            to,
        });
    }
}
