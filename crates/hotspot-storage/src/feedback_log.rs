//! The append-only feedback log and its exports.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use hotspot_core::errors::StorageError;
use hotspot_core::events::FeedbackEvent;
use hotspot_core::types::Detection;

use crate::json_file;

/// One processed feedback batch, stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: u64,
    pub image_id: String,
    pub user_id: String,
    pub original_count: usize,
    pub corrected_count: usize,
    pub original_detections: Vec<Detection>,
    pub user_corrections: Vec<Detection>,
    pub feedback_analysis: Vec<FeedbackEvent>,
}

/// The on-disk document wrapping all entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackDocument {
    pub feedback_entries: Vec<FeedbackEntry>,
}

/// Aggregate counts over the stored entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackStatistics {
    /// Number of stored feedback batches.
    pub total_feedback: usize,
    /// Event occurrences per event kind, across all batches.
    pub feedback_types: BTreeMap<String, u64>,
    /// Timestamp of the most recent batch.
    pub last_feedback: Option<u64>,
}

const CSV_HEADER: &str = "timestamp,image_id,user_id,original_count,corrected_count,feedback_type";

/// Append-only feedback storage.
#[derive(Debug)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry. The document is rewritten whole under its lock.
    pub fn append(&self, entry: FeedbackEntry) -> Result<(), StorageError> {
        let mut document = self.read_document()?;
        document.feedback_entries.push(entry);
        json_file::write_json(&self.path, &document)
    }

    /// All stored entries. Unreadable state degrades to an empty document
    /// with a warning.
    pub fn document(&self) -> FeedbackDocument {
        match self.read_document() {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read feedback log");
                FeedbackDocument::default()
            }
        }
    }

    /// Aggregate statistics over the stored entries.
    pub fn statistics(&self) -> FeedbackStatistics {
        let document = self.document();
        let mut feedback_types = BTreeMap::new();
        for entry in &document.feedback_entries {
            for event in &entry.feedback_analysis {
                *feedback_types.entry(event.kind().to_string()).or_insert(0) += 1;
            }
        }
        FeedbackStatistics {
            total_feedback: document.feedback_entries.len(),
            feedback_types,
            last_feedback: document.feedback_entries.last().map(|e| e.timestamp),
        }
    }

    /// The full document as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(&self.document()).map_err(|e| StorageError::Export {
            message: e.to_string(),
        })
    }

    /// One CSV row per feedback event across all entries.
    pub fn export_csv(&self) -> Result<String, StorageError> {
        let document = self.document();
        let mut lines = vec![CSV_HEADER.to_string()];
        for entry in &document.feedback_entries {
            for event in &entry.feedback_analysis {
                lines.push(format!(
                    "{},{},{},{},{},{}",
                    entry.timestamp,
                    entry.image_id,
                    entry.user_id,
                    entry.original_count,
                    entry.corrected_count,
                    event.kind()
                ));
            }
        }
        Ok(lines.join("\n"))
    }

    fn read_document(&self) -> Result<FeedbackDocument, StorageError> {
        Ok(json_file::read_json(&self.path)?.unwrap_or_default())
    }
}
