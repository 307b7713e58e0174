//! Diffing machine detections against human corrections.
//!
//! Detections are matched by an identity key built from the exact bbox
//! geometry plus the detection's list position. A reviewer who edits a box
//! therefore changes its key: the edit surfaces as a FalsePositive plus a
//! FalseNegative, and matched-pair events only fire for boxes that are
//! pixel-identical at the same index.

use rustc_hash::FxHashMap;

use hotspot_core::events::{BboxChange, FeedbackEvent, SizeChange};
use hotspot_core::types::{BoundingBox, Detection};

/// Area-ratio band outside which a matched box counts as resized.
const AREA_RATIO_TOLERANCE: f64 = 0.2;
/// Manhattan center displacement (px) above which a matched box counts as moved.
const POSITION_TOLERANCE: f64 = 10.0;

/// Compare an original detection set against its corrected counterpart and
/// emit one event per discrepancy.
///
/// Event order is a contract: deletions in original-list order, then
/// additions in corrected-list order, then per matched pair (corrected-list
/// order) bbox change, severity change, category change.
pub fn analyze(original: &[Detection], corrected: &[Detection]) -> Vec<FeedbackEvent> {
    let orig_by_key: FxHashMap<String, &Detection> = original
        .iter()
        .enumerate()
        .map(|(i, det)| (identity_key(det, i), det))
        .collect();
    let corr_by_key: FxHashMap<String, &Detection> = corrected
        .iter()
        .enumerate()
        .map(|(i, det)| (identity_key(det, i), det))
        .collect();

    let mut events = Vec::new();

    // Deletions: original keys absent from the corrected set.
    for (i, det) in original.iter().enumerate() {
        if !corr_by_key.contains_key(&identity_key(det, i)) {
            events.push(FeedbackEvent::FalsePositive {
                deleted: det.clone(),
            });
        }
    }

    // Additions: corrected keys absent from the original set.
    for (i, det) in corrected.iter().enumerate() {
        if !orig_by_key.contains_key(&identity_key(det, i)) {
            events.push(FeedbackEvent::FalseNegative { added: det.clone() });
        }
    }

    // Matched pairs.
    for (i, corr_det) in corrected.iter().enumerate() {
        let Some(orig_det) = orig_by_key.get(&identity_key(corr_det, i)) else {
            continue;
        };

        if let Some(change) = bbox_change(&orig_det.bbox, &corr_det.bbox) {
            events.push(FeedbackEvent::BboxResize {
                category: orig_det.category,
                change,
                original: orig_det.bbox,
                corrected: corr_det.bbox,
            });
        }

        if orig_det.severity != corr_det.severity {
            events.push(FeedbackEvent::SeverityChange {
                category: orig_det.category,
                from: orig_det.severity,
                to: corr_det.severity,
            });
        }

        if orig_det.category != corr_det.category {
            events.push(FeedbackEvent::CategoryChange {
                from: orig_det.category,
                to: corr_det.category,
                bbox: orig_det.bbox,
            });
        }
    }

    events
}

/// Identity key: bbox geometry concatenated with list position.
fn identity_key(det: &Detection, index: usize) -> String {
    let b = &det.bbox;
    format!("{}_{}_{}_{}_{}", b.x, b.y, b.width, b.height, index)
}

/// Measure how a corrected box differs from its original. Zero-area
/// originals are excluded from the ratio comparison rather than dividing.
fn bbox_change(original: &BoundingBox, corrected: &BoundingBox) -> Option<BboxChange> {
    let original_area = original.area();
    if original_area == 0 {
        return None;
    }
    let corrected_area = corrected.area();
    let area_ratio = corrected_area as f64 / original_area as f64;

    if (area_ratio - 1.0).abs() > AREA_RATIO_TOLERANCE {
        return Some(BboxChange {
            area_ratio,
            original_area,
            corrected_area,
            size_change: if area_ratio < 1.0 {
                SizeChange::Smaller
            } else {
                SizeChange::Larger
            },
            position_change: None,
        });
    }

    let (ox, oy) = original.center();
    let (cx, cy) = corrected.center();
    let displacement = (ox - cx).abs() + (oy - cy).abs();
    if displacement > POSITION_TOLERANCE {
        return Some(BboxChange {
            area_ratio,
            original_area,
            corrected_area,
            size_change: SizeChange::Moved,
            position_change: Some(displacement),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_core::types::{FaultCategory, Severity};

    fn detection(
        category: FaultCategory,
        severity: Severity,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Detection {
        Detection::new(category, severity, 0.75, BoundingBox::new(x, y, width, height))
    }

    #[test]
    fn test_deletion_is_false_positive() {
        let original = vec![detection(
            FaultCategory::LooseJoint,
            Severity::Faulty,
            100,
            150,
            80,
            60,
        )];
        let events = analyze(&original, &[]);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FeedbackEvent::FalsePositive { .. }));
    }

    #[test]
    fn test_addition_is_false_negative() {
        let corrected = vec![detection(
            FaultCategory::PointOverload,
            Severity::PotentiallyFaulty,
            10,
            10,
            30,
            30,
        )];
        let events = analyze(&[], &corrected);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FeedbackEvent::FalseNegative { .. }));
    }

    #[test]
    fn test_resized_box_changes_identity() {
        // The key embeds geometry, so a resized box at the same index is a
        // deletion plus an addition, never a matched pair.
        let original = vec![detection(
            FaultCategory::LooseJoint,
            Severity::Faulty,
            150,
            200,
            100,
            80,
        )];
        let corrected = vec![detection(
            FaultCategory::LooseJoint,
            Severity::Faulty,
            150,
            200,
            60,
            50,
        )];
        let events = analyze(&original, &corrected);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], FeedbackEvent::FalsePositive { .. }));
        assert!(matches!(events[1], FeedbackEvent::FalseNegative { .. }));
    }

    #[test]
    fn test_matched_pair_severity_change() {
        let original = vec![detection(
            FaultCategory::PointOverload,
            Severity::Faulty,
            300,
            250,
            50,
            40,
        )];
        let mut corrected = original.clone();
        corrected[0].severity = Severity::PotentiallyFaulty;

        let events = analyze(&original, &corrected);
        assert_eq!(events.len(), 1);
        match &events[0] {
            FeedbackEvent::SeverityChange { from, to, category } => {
                assert_eq!(*from, Severity::Faulty);
                assert_eq!(*to, Severity::PotentiallyFaulty);
                assert_eq!(*category, FaultCategory::PointOverload);
            }
            other => panic!("expected severity change, got {other:?}"),
        }
    }

    #[test]
    fn test_matched_pair_category_change() {
        let original = vec![detection(
            FaultCategory::PointOverload,
            Severity::Faulty,
            20,
            20,
            40,
            40,
        )];
        let mut corrected = original.clone();
        corrected[0].category = FaultCategory::LooseJoint;

        let events = analyze(&original, &corrected);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            FeedbackEvent::CategoryChange {
                from: FaultCategory::PointOverload,
                to: FaultCategory::LooseJoint,
                ..
            }
        ));
    }

    #[test]
    fn test_severity_and_category_change_order() {
        let original = vec![detection(
            FaultCategory::PointOverload,
            Severity::Faulty,
            20,
            20,
            40,
            40,
        )];
        let mut corrected = original.clone();
        corrected[0].severity = Severity::PotentiallyFaulty;
        corrected[0].category = FaultCategory::LooseJoint;

        let events = analyze(&original, &corrected);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], FeedbackEvent::SeverityChange { .. }));
        assert!(matches!(events[1], FeedbackEvent::CategoryChange { .. }));
    }

    #[test]
    fn test_index_is_part_of_identity() {
        // Same boxes, swapped order: every key changes, so the diff reports
        // two deletions and two additions.
        let a = detection(FaultCategory::LooseJoint, Severity::Faulty, 0, 0, 50, 50);
        let b = detection(FaultCategory::PointOverload, Severity::Faulty, 60, 60, 20, 20);
        let events = analyze(&[a.clone(), b.clone()], &[b, a]);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_bbox_change_ratio_and_movement() {
        let base = BoundingBox::new(100, 100, 50, 40);
        // 20% shrink in one dimension: ratio 0.8, inside tolerance.
        assert!(bbox_change(&base, &BoundingBox::new(100, 100, 40, 40)).is_none());
        // Halved area.
        let change = bbox_change(&base, &BoundingBox::new(100, 100, 25, 40)).unwrap();
        assert_eq!(change.size_change, SizeChange::Smaller);
        assert!((change.area_ratio - 0.5).abs() < 1e-9);
        // Same size, moved 15px right.
        let change = bbox_change(&base, &BoundingBox::new(115, 100, 50, 40)).unwrap();
        assert_eq!(change.size_change, SizeChange::Moved);
        assert_eq!(change.position_change, Some(15.0));
    }

    #[test]
    fn test_zero_area_original_excluded() {
        let zero = BoundingBox::new(10, 10, 0, 0);
        assert!(bbox_change(&zero, &BoundingBox::new(10, 10, 50, 50)).is_none());
    }
}
