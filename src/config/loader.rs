// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variables that override values from the config file.
pub const ENV_CLUSTER: &str = "TASKFLEET_CLUSTER";
pub const ENV_REGION: &str = "TASKFLEET_REGION";
pub const ENV_SUBNET_ID: &str = "TASKFLEET_SUBNET_ID";
pub const ENV_SECURITY_GROUP_ID: &str = "TASKFLEET_SECURITY_GROUP_ID";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** parse durations
/// or compile patterns. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, apply environment overrides and
/// validate.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    apply_env_overrides(&mut raw_config, |key| std::env::var(key).ok());
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration the CLI should run with.
///
/// - An explicit path must exist.
/// - Without one, `Taskfleet.toml` is used when present, otherwise the
///   built-in defaults (still subject to env overrides).
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.is_file() {
        debug!(path = %path.display(), "loading default config file");
        return load_and_validate(&path);
    }

    debug!("no config file found; using built-in defaults");
    let mut raw = RawConfigFile::default();
    apply_env_overrides(&mut raw, |key| std::env::var(key).ok());
    ConfigFile::try_from(raw)
}

/// Apply `TASKFLEET_*` overrides on top of a raw config.
///
/// The lookup is injected so callers (and tests) decide where values come
/// from. Empty values are ignored.
pub fn apply_env_overrides<F>(raw: &mut RawConfigFile, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(cluster) = get(ENV_CLUSTER) {
        raw.cluster.name = cluster;
    }
    if let Some(region) = get(ENV_REGION) {
        raw.cluster.region = region;
    }
    if let Some(subnet) = get(ENV_SUBNET_ID) {
        raw.cluster.subnets = vec![subnet];
    }
    if let Some(sg) = get(ENV_SECURITY_GROUP_ID) {
        raw.cluster.security_groups = vec![sg];
    }
}

/// Default config path: `Taskfleet.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskfleet.toml")
}
