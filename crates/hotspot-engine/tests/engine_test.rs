//! End-to-end tests for the inspection engine: feedback scenarios,
//! persistence across restarts, statistics, and export.

use image::{Rgb, RgbImage};
use ndarray::Array2;

use hotspot_engine::{
    AdaptiveParameters, BoundingBox, Detection, EngineConfig, ExportFormat, FaultCategory,
    ImageStatus, InspectionEngine, OutcomeStatus, Severity,
};

fn engine_in(dir: &tempfile::TempDir) -> InspectionEngine {
    InspectionEngine::new(EngineConfig::with_data_dir(dir.path()))
}

fn detection(category: FaultCategory, severity: Severity, bbox: BoundingBox) -> Detection {
    Detection::new(category, severity, 0.75, bbox)
}

/// Reviewer deletes a detection: one false positive, threshold rises by 3
/// and the change survives a restart.
#[test]
fn test_deletion_feedback_adapts_and_persists() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let original = vec![detection(
        FaultCategory::LooseJoint,
        Severity::Faulty,
        BoundingBox::new(100, 150, 80, 60),
    )];
    let outcome = engine.process_feedback("thermal_001", "engineer_1", original, vec![]);

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.message, "Processed 1 feedback items");
    assert_eq!(outcome.adaptations_applied, vec!["false_positive"]);
    assert_eq!(outcome.feedback_count, 1);
    assert_eq!(outcome.current_percent_threshold, 53);

    drop(engine);
    let reopened = engine_in(&dir);
    assert_eq!(
        reopened.get_parameters().sensitivity.percent_threshold,
        53
    );
}

/// Reviewer shrinks a box in place. Identity embeds geometry, so this is a
/// false positive plus a false negative, never a bbox resize.
#[test]
fn test_resize_in_place_reports_delete_and_add() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let original = vec![detection(
        FaultCategory::LooseJoint,
        Severity::Faulty,
        BoundingBox::new(150, 200, 100, 80),
    )];
    let corrected = vec![detection(
        FaultCategory::LooseJoint,
        Severity::Faulty,
        BoundingBox::new(150, 200, 60, 50),
    )];
    let outcome = engine.process_feedback("thermal_002", "engineer_1", original, corrected);

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(
        outcome.adaptations_applied,
        vec!["false_positive", "false_negative"]
    );
    assert_eq!(outcome.feedback_count, 2);
    // +3 then -3 cancels on the threshold.
    assert_eq!(outcome.current_percent_threshold, 50);
    // ×1.2 then ×0.8 compounds on the area factor.
    assert!((outcome.current_min_area_factor - 0.00096).abs() < 1e-12);
}

/// Severity correction on a pixel-identical box moves the faulty threshold.
#[test]
fn test_severity_correction_adapts_threshold() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let original = vec![detection(
        FaultCategory::PointOverload,
        Severity::Faulty,
        BoundingBox::new(300, 250, 50, 40),
    )];
    let mut corrected = original.clone();
    corrected[0].severity = Severity::PotentiallyFaulty;

    let outcome = engine.process_feedback("thermal_003", "engineer_1", original, corrected);
    assert_eq!(outcome.adaptations_applied, vec!["severity_change"]);
    let params = engine.get_parameters();
    assert!((params.severity_rules.faulty_red_orange_threshold - 0.55).abs() < 1e-9);
}

/// Statistics and CSV export agree: one CSV row per stored event.
#[test]
fn test_statistics_and_export_agree() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    // Batch 1: two deletions.
    let original = vec![
        detection(
            FaultCategory::LooseJoint,
            Severity::Faulty,
            BoundingBox::new(10, 10, 60, 60),
        ),
        detection(
            FaultCategory::PointOverload,
            Severity::PotentiallyFaulty,
            BoundingBox::new(80, 10, 20, 20),
        ),
    ];
    engine.process_feedback("img_1", "user_1", original, vec![]);

    // Batch 2: one addition.
    let corrected = vec![detection(
        FaultCategory::PointOverload,
        Severity::Faulty,
        BoundingBox::new(5, 5, 30, 30),
    )];
    engine.process_feedback("img_2", "user_1", vec![], corrected);

    let stats = engine.get_statistics();
    assert_eq!(stats.total_feedback, 2);
    assert_eq!(stats.feedback_types["false_positive"], 2);
    assert_eq!(stats.feedback_types["false_negative"], 1);

    let csv = engine.export_log(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 3);
    assert_eq!(
        lines[0],
        "timestamp,image_id,user_id,original_count,corrected_count,feedback_type"
    );

    let json = engine.export_log(ExportFormat::Json).unwrap();
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["feedback_entries"].as_array().unwrap().len(), 2);
}

/// An empty diff is a successful no-op batch.
#[test]
fn test_identical_sets_are_a_noop() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let detections = vec![detection(
        FaultCategory::LooseJoint,
        Severity::Faulty,
        BoundingBox::new(10, 10, 50, 50),
    )];
    let outcome =
        engine.process_feedback("img_1", "user_1", detections.clone(), detections);

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.feedback_count, 0);
    assert!(outcome.adaptations_applied.is_empty());
    assert_eq!(engine.get_parameters(), AdaptiveParameters::default());
    // The batch is still logged.
    assert_eq!(engine.get_statistics().total_feedback, 1);
    // But no parameter change is recorded.
    assert!(engine.change_records().is_empty());
}

/// Reset restores defaults, persists them, and lands in the change log.
#[test]
fn test_reset_restores_defaults_and_is_recorded() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    // Drift the parameters first.
    for i in 0..3 {
        let original = vec![detection(
            FaultCategory::LooseJoint,
            Severity::Faulty,
            BoundingBox::new(10 + i, 10, 50, 50),
        )];
        engine.process_feedback("img", "user", original, vec![]);
    }
    assert_eq!(engine.get_parameters().sensitivity.percent_threshold, 59);

    let defaults = engine.reset_parameters();
    assert_eq!(defaults, AdaptiveParameters::default());

    let records = engine.change_records();
    let reset_record = records.last().unwrap();
    assert_eq!(reset_record.feedback_types, vec!["reset"]);

    drop(engine);
    let reopened = engine_in(&dir);
    assert_eq!(reopened.get_parameters(), AdaptiveParameters::default());
}

/// A black image with no heatmap classifies as Normal with no detections.
#[test]
fn test_black_image_classifies_normal() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let image = RgbImage::new(100, 100);
    let outcome = engine.classify(&image, None);
    assert_eq!(outcome.status, ImageStatus::Normal);
    assert!(outcome.detections.is_empty());
    assert_eq!(outcome.sensitivity_threshold, None);
}

/// A warm block is detected and the heatmap threshold is reported.
#[test]
fn test_warm_image_classifies_anomalies() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    let mut image = RgbImage::new(100, 100);
    for y in 35..65 {
        for x in 30..60 {
            image.put_pixel(x, y, Rgb([255, 40, 0]));
        }
    }
    let heatmap = Array2::from_elem((100, 100), 0.2f32);

    let outcome = engine.classify(&image, Some(&heatmap));
    assert_eq!(outcome.status, ImageStatus::Anomalies);
    assert_eq!(outcome.detections.len(), 1);
    let det = &outcome.detections[0];
    assert_eq!(det.bbox, BoundingBox::new(30, 35, 30, 30));
    assert!(det.confidence > 0.0 && det.confidence <= 1.0);
    // Constant heatmap: threshold equals its mean.
    assert!((outcome.sensitivity_threshold.unwrap() - 0.2).abs() < 1e-6);
}

/// Feedback keyed off adapted parameters: classification after feedback
/// uses the mutated tree.
#[test]
fn test_adaptation_feeds_back_into_classification() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = engine_in(&dir);

    // A warm region of 6x6 = 36 pixels sits just above the default 32-pixel
    // area floor on a 100x100 image.
    let mut image = RgbImage::new(100, 100);
    for y in 20..26 {
        for x in 20..26 {
            image.put_pixel(x, y, Rgb([255, 40, 0]));
        }
    }
    assert_eq!(
        engine.classify(&image, None).status,
        ImageStatus::Anomalies
    );

    // Repeated false-positive feedback grows min_area_factor to its 0.005
    // ceiling, raising the floor to 50 pixels and suppressing the region.
    for i in 0..10u32 {
        let original = vec![detection(
            FaultCategory::PointOverload,
            Severity::PotentiallyFaulty,
            BoundingBox::new(i, 0, 10, 10),
        )];
        engine.process_feedback("img", "user", original, vec![]);
    }
    assert!((engine.get_parameters().sensitivity.min_area_factor - 0.005).abs() < 1e-12);
    assert_eq!(engine.classify(&image, None).status, ImageStatus::Normal);
}
