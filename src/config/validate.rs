// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ClusterSection, ConfigFile, FleetSection, FleetSettings, LaunchSection, LaunchSettings,
    RawConfigFile, SlowStartMatcher,
};
use crate::errors::{Result, TaskfleetError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskfleetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_cluster(&raw.cluster)?;
        let launch = validate_launch(&raw.launch)?;
        let fleet = validate_fleet(&raw.fleet)?;
        Ok(ConfigFile::new_unchecked(raw.cluster, launch, fleet))
    }
}

fn validate_cluster(cluster: &ClusterSection) -> Result<()> {
    if cluster.name.trim().is_empty() {
        return Err(TaskfleetError::ConfigError(
            "[cluster].name must not be empty".to_string(),
        ));
    }
    if cluster.region.trim().is_empty() {
        return Err(TaskfleetError::ConfigError(
            "[cluster].region must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_launch(launch: &LaunchSection) -> Result<LaunchSettings> {
    if launch.batch_size == 0 {
        return Err(TaskfleetError::ConfigError(
            "[launch].batch_size must be >= 1 (got 0)".to_string(),
        ));
    }

    let slow_start = SlowStartMatcher::new(&launch.slow_start).map_err(|e| {
        TaskfleetError::ConfigError(format!("[launch].slow_start has an invalid pattern: {e}"))
    })?;

    Ok(LaunchSettings {
        batch_size: launch.batch_size,
        max_launch_retries: launch.max_launch_retries,
        max_retry_passes: launch.max_retry_passes,
        retry_delay: duration_field("launch", "retry_delay", &launch.retry_delay)?,
        capacity_retry_delay: duration_field(
            "launch",
            "capacity_retry_delay",
            &launch.capacity_retry_delay,
        )?,
        slow_start_warmup: duration_field("launch", "slow_start_warmup", &launch.slow_start_warmup)?,
        inter_task_delay: duration_field("launch", "inter_task_delay", &launch.inter_task_delay)?,
        inter_batch_delay: duration_field("launch", "inter_batch_delay", &launch.inter_batch_delay)?,
        retry_pass_delay: duration_field("launch", "retry_pass_delay", &launch.retry_pass_delay)?,
        slow_start,
    })
}

fn validate_fleet(fleet: &FleetSection) -> Result<FleetSettings> {
    // ListTasks accepts at most 100 results per page.
    if !(1..=100).contains(&fleet.max_results) {
        return Err(TaskfleetError::ConfigError(format!(
            "[fleet].max_results must be between 1 and 100 (got {})",
            fleet.max_results
        )));
    }

    let poll_interval = duration_field("fleet", "poll_interval", &fleet.poll_interval)?;
    if poll_interval.is_zero() {
        return Err(TaskfleetError::ConfigError(
            "[fleet].poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(FleetSettings {
        max_results: fleet.max_results,
        poll_interval,
    })
}

fn duration_field(section: &str, field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| TaskfleetError::ConfigError(format!("[{section}].{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_raw_config_validates() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.cluster.name, "SYB");
        assert_eq!(cfg.launch.batch_size, 25);
        assert_eq!(cfg.launch.retry_pass_delay, Duration::from_secs(5));
        assert_eq!(cfg.fleet.max_results, 100);
        assert_eq!(cfg.fleet.poll_interval, Duration::from_secs(45));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.launch.batch_size = 0;
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn invalid_slow_start_pattern_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.launch.slow_start = vec!["Video_(Mix".to_string()];
        match ConfigFile::try_from(raw) {
            Err(TaskfleetError::ConfigError(msg)) => assert!(msg.contains("slow_start")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn max_results_above_page_limit_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.fleet.max_results = 101;
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn bad_duration_names_the_field() {
        let mut raw = RawConfigFile::default();
        raw.launch.capacity_retry_delay = "five".to_string();
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("[launch].capacity_retry_delay"));
    }
}
