//! Core types, events, errors, configuration, and the adaptive parameter
//! tree shared by the Hotspot analysis, storage, and engine crates.

pub mod config;
pub mod errors;
pub mod events;
pub mod params;
pub mod time;
pub mod types;
