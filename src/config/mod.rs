// src/config/mod.rs

//! Configuration loading and validation for taskfleet.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply env overrides (`loader.rs`).
//! - Validate and convert into typed settings (`validate.rs`).
//! - Parse human duration strings like `"5s"` (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{apply_env_overrides, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ClusterSection, ClusterSettings, ConfigFile, FleetSection, FleetSettings, LaunchSection,
    LaunchSettings, RawConfigFile, SlowStartMatcher,
};
