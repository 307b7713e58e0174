//! Engine configuration.
//! TOML-based: project file (`hotspot.toml`) > environment > defaults.

pub mod engine_config;

pub use engine_config::EngineConfig;
