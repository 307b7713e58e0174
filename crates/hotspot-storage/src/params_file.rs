//! The persisted adaptive parameter document.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use hotspot_core::config::EngineConfig;
use hotspot_core::errors::ParamsError;
use hotspot_core::params::AdaptiveParameters;

use crate::json_file;

/// Owns the in-memory parameter tree and its JSON document on disk.
///
/// Loading merges the saved document onto compiled defaults (unreadable
/// state degrades to defaults with a warning). Every mutation persists
/// immediately; a failed write is logged and the in-memory tree stays
/// authoritative for the rest of the process.
#[derive(Debug)]
pub struct ParameterStore {
    path: PathBuf,
    current: AdaptiveParameters,
}

impl ParameterStore {
    /// Load the store for an engine configuration.
    pub fn load(config: &EngineConfig) -> Self {
        Self::open(config.parameters_path())
    }

    /// Load the store from an explicit document path.
    pub fn open(path: PathBuf) -> Self {
        let current = match json_file::read_json::<AdaptiveParameters>(&path) {
            Ok(Some(params)) => params,
            Ok(None) => AdaptiveParameters::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load parameters, using defaults");
                AdaptiveParameters::default()
            }
        };
        Self { path, current }
    }

    pub fn current(&self) -> &AdaptiveParameters {
        &self.current
    }

    /// Clone of the full tree, for lock-free classification runs.
    pub fn snapshot(&self) -> AdaptiveParameters {
        self.current.clone()
    }

    /// Mutate the tree in place and persist.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut AdaptiveParameters) -> R) -> R {
        let result = mutate(&mut self.current);
        self.persist();
        result
    }

    /// Read one group or leaf by name.
    pub fn get_value(&self, category: &str, key: Option<&str>) -> Result<Value, ParamsError> {
        self.current.get_value(category, key)
    }

    /// Replace one leaf by name and persist.
    pub fn set_value(&mut self, category: &str, key: &str, value: Value) -> Result<(), ParamsError> {
        self.current.set_value(category, key, value)?;
        self.persist();
        Ok(())
    }

    /// Replace the tree with compiled defaults and persist. Returns the new
    /// tree.
    pub fn reset(&mut self) -> AdaptiveParameters {
        self.current = AdaptiveParameters::default();
        self.persist();
        info!("adaptive parameters reset to defaults");
        self.snapshot()
    }

    /// Write the full tree to disk. Failures are non-fatal: the in-memory
    /// tree remains authoritative.
    pub fn persist(&self) {
        if let Err(e) = json_file::write_json(&self.path, &self.current) {
            warn!(path = %self.path.display(), error = %e, "could not save parameters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_in(dir: &tempfile::TempDir) -> ParameterStore {
        ParameterStore::open(dir.path().join("adaptive_parameters.json"))
    }

    #[test]
    fn test_fresh_store_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.current(), &AdaptiveParameters::default());
    }

    #[test]
    fn test_mutations_survive_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.update(|p| p.sensitivity.percent_threshold = 71);

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.current().sensitivity.percent_threshold, 71);
    }

    #[test]
    fn test_corrupt_document_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("adaptive_parameters.json"), "{broken").unwrap();
        let store = store_in(&dir);
        assert_eq!(store.current(), &AdaptiveParameters::default());
    }

    #[test]
    fn test_partial_document_deep_merges() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("adaptive_parameters.json"),
            r#"{"severity_rules": {"faulty_red_orange_threshold": 0.65}}"#,
        )
        .unwrap();
        let store = store_in(&dir);
        assert!((store.current().severity_rules.faulty_red_orange_threshold - 0.65).abs() < 1e-12);
        assert_eq!(store.current().sensitivity.percent_threshold, 50);
    }

    #[test]
    fn test_set_value_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store
            .set_value("sensitivity", "percent_threshold", json!(64))
            .unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.current().sensitivity.percent_threshold, 64);
    }

    #[test]
    fn test_reset_restores_and_persists_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.update(|p| p.sensitivity.percent_threshold = 88);
        let defaults = store.reset();
        assert_eq!(defaults, AdaptiveParameters::default());

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.current(), &AdaptiveParameters::default());
    }
}
