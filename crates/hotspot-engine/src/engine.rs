//! The inspection engine facade.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use image::RgbImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hotspot_analysis::feedback::{analyze, apply};
use hotspot_analysis::{classify, ClassificationOutcome};
use hotspot_core::config::EngineConfig;
use hotspot_core::errors::{FeedbackError, StorageError};
use hotspot_core::params::AdaptiveParameters;
use hotspot_core::time::unix_timestamp;
use hotspot_core::types::Detection;
use hotspot_storage::{
    ChangeTracker, DetectionCounts, FeedbackEntry, FeedbackLog, FeedbackStatistics,
    ParameterChangeRecord, ParameterStore,
};

/// Outcome status of a feedback batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Response of [`InspectionEngine::process_feedback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    /// Event kinds in the order their adaptations were applied.
    pub adaptations_applied: Vec<String>,
    pub feedback_count: usize,
    /// Parameter echoes for monitoring dashboards.
    pub current_percent_threshold: u32,
    pub current_min_area_factor: f64,
}

/// Export formats for the feedback log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

struct EngineState {
    store: ParameterStore,
    feedback_log: FeedbackLog,
    tracker: ChangeTracker,
}

/// Process-wide inspection service.
///
/// Classification reads a parameter snapshot and runs lock-free; feedback
/// processing, parameter writes, and log appends all serialize through one
/// mutex, so concurrent batches cannot lose nested-field updates.
pub struct InspectionEngine {
    state: Mutex<EngineState>,
}

impl InspectionEngine {
    /// Construct an engine: loads persisted parameters (or defaults) and
    /// opens the logs.
    pub fn new(config: EngineConfig) -> Self {
        let state = EngineState {
            store: ParameterStore::load(&config),
            feedback_log: FeedbackLog::new(config.feedback_path()),
            tracker: ChangeTracker::new(config.changes_path(), config.changes_csv_path()),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Classify one image against the current parameters.
    pub fn classify(
        &self,
        image: &RgbImage,
        heatmap: Option<&Array2<f32>>,
    ) -> ClassificationOutcome {
        let params = self.lock().store.snapshot();
        classify(image, heatmap, &params)
    }

    /// Process one human-corrected detection set: diff, log, adapt, record.
    ///
    /// Errors are caught per batch and surfaced in the outcome without any
    /// parameter mutation; persistence failures inside a successful batch
    /// degrade to warnings.
    pub fn process_feedback(
        &self,
        image_id: &str,
        user_id: &str,
        original: Vec<Detection>,
        corrected: Vec<Detection>,
    ) -> FeedbackOutcome {
        let mut state = self.lock();
        match state.process_batch(image_id, user_id, original, corrected) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(image_id, user_id, error = %e, "feedback batch failed");
                let sensitivity = &state.store.current().sensitivity;
                FeedbackOutcome {
                    status: OutcomeStatus::Error,
                    message: format!("Failed to process feedback: {e}"),
                    adaptations_applied: Vec::new(),
                    feedback_count: 0,
                    current_percent_threshold: sensitivity.percent_threshold,
                    current_min_area_factor: sensitivity.min_area_factor,
                }
            }
        }
    }

    /// Current adaptive parameters.
    pub fn get_parameters(&self) -> AdaptiveParameters {
        self.lock().store.snapshot()
    }

    /// Reset the parameters to compiled defaults, persist, and record the
    /// reset in the change log. Returns the default tree.
    pub fn reset_parameters(&self) -> AdaptiveParameters {
        let mut state = self.lock();
        let before = state.store.snapshot();
        let defaults = state.store.reset();
        if let Err(e) = state.tracker.record_reset(&before, &defaults) {
            warn!(error = %e, "could not record parameter reset");
        }
        defaults
    }

    /// Aggregate statistics over the stored feedback entries.
    pub fn get_statistics(&self) -> FeedbackStatistics {
        self.lock().feedback_log.statistics()
    }

    /// Export the feedback log.
    pub fn export_log(&self, format: ExportFormat) -> Result<String, StorageError> {
        let state = self.lock();
        match format {
            ExportFormat::Json => state.feedback_log.export_json(),
            ExportFormat::Csv => state.feedback_log.export_csv(),
        }
    }

    /// All recorded parameter changes, oldest first.
    pub fn change_records(&self) -> Vec<ParameterChangeRecord> {
        self.lock().tracker.records()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        // A panicked batch has already been rolled back (mutation only
        // happens after analysis succeeds), so the state is usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EngineState {
    fn process_batch(
        &mut self,
        image_id: &str,
        user_id: &str,
        original: Vec<Detection>,
        corrected: Vec<Detection>,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        let events = analyze(&original, &corrected);
        let added = events
            .iter()
            .filter(|e| e.kind() == "false_negative")
            .count();

        let entry = FeedbackEntry {
            timestamp: unix_timestamp(),
            image_id: image_id.to_string(),
            user_id: user_id.to_string(),
            original_count: original.len(),
            corrected_count: corrected.len(),
            original_detections: original,
            user_corrections: corrected,
            feedback_analysis: events.clone(),
        };
        let detection_counts = DetectionCounts {
            original: entry.original_count,
            corrected: entry.corrected_count,
            added,
        };
        if let Err(e) = self.feedback_log.append(entry) {
            warn!(image_id, error = %e, "could not store feedback entry");
        }

        let before = self.store.snapshot();
        let mut adaptations_applied = Vec::with_capacity(events.len());
        for event in &events {
            // Each event's mutation persists before the next applies.
            self.store.update(|params| apply(params, event));
            adaptations_applied.push(event.kind().to_string());
        }

        if !events.is_empty() {
            let after = self.store.snapshot();
            if let Err(e) = self.tracker.record(
                image_id,
                user_id,
                adaptations_applied.clone(),
                detection_counts,
                &before,
                &after,
            ) {
                warn!(image_id, error = %e, "could not record parameter change");
            }
        }

        info!(
            image_id,
            user_id,
            feedback_count = events.len(),
            "feedback batch processed"
        );
        let sensitivity = &self.store.current().sensitivity;
        Ok(FeedbackOutcome {
            status: OutcomeStatus::Success,
            message: format!("Processed {} feedback items", events.len()),
            adaptations_applied,
            feedback_count: events.len(),
            current_percent_threshold: sensitivity.percent_threshold,
            current_min_area_factor: sensitivity.min_area_factor,
        })
    }
}
