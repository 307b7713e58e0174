//! Engine configuration: where persisted state lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Locations of the durable artifacts: the parameter document, the feedback
/// log, and the parameter change log (JSON + flattened CSV).
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`HOTSPOT_*`)
/// 2. Project config (`hotspot.toml` in the given root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding all persisted state. Default: `feedback_data`.
    pub data_dir: PathBuf,
    /// Adaptive parameter document. Default: `adaptive_parameters.json`.
    pub parameters_file: String,
    /// Append-only feedback entries. Default: `user_corrections.json`.
    pub feedback_file: String,
    /// Append-only change records. Default: `parameter_changes.json`.
    pub changes_file: String,
    /// Flattened CSV mirror of the change records. Default: `parameter_changes.csv`.
    pub changes_csv_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("feedback_data"),
            parameters_file: "adaptive_parameters.json".to_string(),
            feedback_file: "user_corrections.json".to_string(),
            changes_file: "parameter_changes.json".to_string(),
            changes_csv_file: "parameter_changes.csv".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration for a project root.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_path = root.join("hotspot.toml");
        if project_path.exists() {
            let content = std::fs::read_to_string(&project_path).map_err(|_| {
                ConfigError::FileNotFound {
                    path: project_path.display().to_string(),
                }
            })?;
            config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: project_path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        if let Ok(dir) = std::env::var("HOTSPOT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in [
            ("parameters_file", &self.parameters_file),
            ("feedback_file", &self.feedback_file),
            ("changes_file", &self.changes_file),
            ("changes_csv_file", &self.changes_csv_file),
        ] {
            if name.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn parameters_path(&self) -> PathBuf {
        self.data_dir.join(&self.parameters_file)
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join(&self.feedback_file)
    }

    pub fn changes_path(&self) -> PathBuf {
        self.data_dir.join(&self.changes_file)
    }

    pub fn changes_csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.changes_csv_file)
    }

    /// Point every persisted artifact into the given directory.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }
}
