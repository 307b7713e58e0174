//! The parameter change log: before/after snapshots with per-leaf deltas,
//! persisted as a JSON array and a parallel flattened CSV.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hotspot_core::errors::StorageError;
use hotspot_core::params::{flatten_numeric, AdaptiveParameters};
use hotspot_core::time::unix_timestamp;

use crate::json_file;

/// Detection counts at the time of a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionCounts {
    pub original: usize,
    pub corrected: usize,
    pub added: usize,
}

/// One numeric leaf that changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: f64,
    pub to: f64,
    pub delta: f64,
}

/// Immutable record of one parameter mutation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChangeRecord {
    pub timestamp: u64,
    pub image_id: String,
    pub user_id: String,
    pub feedback_types: Vec<String>,
    pub detection_counts: DetectionCounts,
    pub parameters_before: AdaptiveParameters,
    pub parameters_after: AdaptiveParameters,
    /// Dotted leaf path to the measured change, for leaves that moved.
    pub changes: BTreeMap<String, FieldChange>,
}

/// Records parameter changes and keeps running feedback-type counters.
///
/// The CSV mirror has a fixed schema: identity columns, then
/// `before_<leaf>`, `after_<leaf>`, and `delta_<leaf>` for every numeric
/// leaf of the tree in sorted path order, so all rows stay parallel no
/// matter which fields a given batch touched.
#[derive(Debug)]
pub struct ChangeTracker {
    json_path: PathBuf,
    csv_path: PathBuf,
    type_counts: FxHashMap<String, u64>,
}

impl ChangeTracker {
    /// Open the tracker, seeding the counters from any existing records.
    pub fn new(json_path: PathBuf, csv_path: PathBuf) -> Self {
        let mut tracker = Self {
            json_path,
            csv_path,
            type_counts: FxHashMap::default(),
        };
        for record in tracker.records() {
            for kind in &record.feedback_types {
                *tracker.type_counts.entry(kind.clone()).or_insert(0) += 1;
            }
        }
        tracker
    }

    /// Append a change record for a feedback batch.
    pub fn record(
        &mut self,
        image_id: &str,
        user_id: &str,
        feedback_types: Vec<String>,
        detection_counts: DetectionCounts,
        before: &AdaptiveParameters,
        after: &AdaptiveParameters,
    ) -> Result<ParameterChangeRecord, StorageError> {
        let record = ParameterChangeRecord {
            timestamp: unix_timestamp(),
            image_id: image_id.to_string(),
            user_id: user_id.to_string(),
            feedback_types,
            detection_counts,
            parameters_before: before.clone(),
            parameters_after: after.clone(),
            changes: compute_changes(before, after),
        };

        for kind in &record.feedback_types {
            *self.type_counts.entry(kind.clone()).or_insert(0) += 1;
        }

        self.append_json(&record)?;
        self.append_csv(&record)?;
        debug!(
            image_id,
            user_id,
            changed = record.changes.len(),
            "parameter change recorded"
        );
        Ok(record)
    }

    /// Append a record for a reset to defaults.
    pub fn record_reset(
        &mut self,
        before: &AdaptiveParameters,
        after: &AdaptiveParameters,
    ) -> Result<ParameterChangeRecord, StorageError> {
        self.record(
            "",
            "",
            vec!["reset".to_string()],
            DetectionCounts::default(),
            before,
            after,
        )
    }

    /// All stored records. Unreadable state degrades to empty with a warning.
    pub fn records(&self) -> Vec<ParameterChangeRecord> {
        match json_file::read_json::<Vec<ParameterChangeRecord>>(&self.json_path) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.json_path.display(), error = %e, "could not read change log");
                Vec::new()
            }
        }
    }

    /// Running feedback-type counters across all recorded changes.
    pub fn type_counts(&self) -> &FxHashMap<String, u64> {
        &self.type_counts
    }

    fn append_json(&self, record: &ParameterChangeRecord) -> Result<(), StorageError> {
        let mut records = self.records();
        records.push(record.clone());
        json_file::write_json(&self.json_path, &records)
    }

    fn append_csv(&self, record: &ParameterChangeRecord) -> Result<(), StorageError> {
        let before = flatten_numeric(&record.parameters_before);
        let after = flatten_numeric(&record.parameters_after);

        let mut row = vec![
            record.timestamp.to_string(),
            record.image_id.clone(),
            record.user_id.clone(),
            record.feedback_types.join(";"),
            record.detection_counts.original.to_string(),
            record.detection_counts.corrected.to_string(),
            record.detection_counts.added.to_string(),
        ];
        for value in before.values() {
            row.push(value.to_string());
        }
        for value in after.values() {
            row.push(value.to_string());
        }
        for (path, value) in &before {
            row.push((after[path] - value).to_string());
        }

        let needs_header = std::fs::metadata(&self.csv_path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        if needs_header {
            json_file::append_line(&self.csv_path, &csv_header(&before))?;
        }
        json_file::append_line(&self.csv_path, &row.join(","))?;
        Ok(())
    }
}

fn csv_header(leaves: &BTreeMap<String, f64>) -> String {
    let mut columns = vec![
        "timestamp".to_string(),
        "image_id".to_string(),
        "user_id".to_string(),
        "feedback_types".to_string(),
        "original_detections".to_string(),
        "corrected_detections".to_string(),
        "added_detections".to_string(),
    ];
    for path in leaves.keys() {
        columns.push(format!("before_{path}"));
    }
    for path in leaves.keys() {
        columns.push(format!("after_{path}"));
    }
    for path in leaves.keys() {
        columns.push(format!("delta_{path}"));
    }
    columns.join(",")
}

fn compute_changes(
    before: &AdaptiveParameters,
    after: &AdaptiveParameters,
) -> BTreeMap<String, FieldChange> {
    let before = flatten_numeric(before);
    let after = flatten_numeric(after);
    before
        .into_iter()
        .filter_map(|(path, from)| {
            let to = *after.get(&path)?;
            if (to - from).abs() > f64::EPSILON {
                Some((
                    path,
                    FieldChange {
                        from,
                        to,
                        delta: to - from,
                    },
                ))
            } else {
                None
            }
        })
        .collect()
}
