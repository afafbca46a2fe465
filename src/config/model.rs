// src/config/model.rs

use std::time::Duration;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 25;
pub const DEFAULT_MAX_LAUNCH_RETRIES: u32 = 3;
pub const DEFAULT_MAX_RETRY_PASSES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_CAPACITY_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_SLOW_START_WARMUP: Duration = Duration::from_secs(1);
pub const DEFAULT_INTER_TASK_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_PASS_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_SLOW_START_PATTERNS: &[&str] = &["Video_Mix"];
pub const DEFAULT_MAX_RESULTS: u32 = 100;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(45);

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [cluster]
/// name = "SYB"
/// region = "us-west-1"
/// subnets = ["subnet-0abc"]
/// security_groups = ["sg-0abc"]
///
/// [launch]
/// batch_size = 25
/// retry_delay = "2s"
/// slow_start = ["Video_Mix"]
///
/// [fleet]
/// max_results = 100
/// ```
///
/// All sections are optional and have reasonable defaults. Durations stay
/// strings here and are parsed during validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub cluster: ClusterSection,

    #[serde(default)]
    pub launch: LaunchSection,

    #[serde(default)]
    pub fleet: FleetSection,
}

/// `[cluster]` section: where tasks are launched and how they are networked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterSection {
    #[serde(default = "default_cluster_name")]
    pub name: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub subnets: Vec<String>,

    #[serde(default)]
    pub security_groups: Vec<String>,

    #[serde(default = "default_capacity_provider")]
    pub capacity_provider: String,

    #[serde(default = "default_true")]
    pub assign_public_ip: bool,
}

fn default_cluster_name() -> String {
    "SYB".to_string()
}

fn default_region() -> String {
    "us-west-1".to_string()
}

fn default_capacity_provider() -> String {
    "FARGATE_SPOT".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
            region: default_region(),
            subnets: Vec::new(),
            security_groups: Vec::new(),
            capacity_provider: default_capacity_provider(),
            assign_public_ip: true,
        }
    }
}

/// `[launch]` section: batching, retry ceilings and cooldowns.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchSection {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_max_launch_retries")]
    pub max_launch_retries: u32,

    #[serde(default = "default_max_retry_passes")]
    pub max_retry_passes: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    #[serde(default = "default_capacity_retry_delay")]
    pub capacity_retry_delay: String,

    #[serde(default = "default_one_second")]
    pub slow_start_warmup: String,

    #[serde(default = "default_one_second")]
    pub inter_task_delay: String,

    #[serde(default = "default_one_second")]
    pub inter_batch_delay: String,

    #[serde(default = "default_capacity_retry_delay")]
    pub retry_pass_delay: String,

    /// Regex patterns; a task definition matching any of them is launched
    /// with the slow-start warm-up and inter-task delays.
    #[serde(default = "default_slow_start")]
    pub slow_start: Vec<String>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_launch_retries() -> u32 {
    DEFAULT_MAX_LAUNCH_RETRIES
}

fn default_max_retry_passes() -> u32 {
    DEFAULT_MAX_RETRY_PASSES
}

fn default_retry_delay() -> String {
    "2s".to_string()
}

fn default_capacity_retry_delay() -> String {
    "5s".to_string()
}

fn default_one_second() -> String {
    "1s".to_string()
}

fn default_slow_start() -> Vec<String> {
    DEFAULT_SLOW_START_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_launch_retries: default_max_launch_retries(),
            max_retry_passes: default_max_retry_passes(),
            retry_delay: default_retry_delay(),
            capacity_retry_delay: default_capacity_retry_delay(),
            slow_start_warmup: default_one_second(),
            inter_task_delay: default_one_second(),
            inter_batch_delay: default_one_second(),
            retry_pass_delay: default_capacity_retry_delay(),
            slow_start: default_slow_start(),
        }
    }
}

/// `[fleet]` section: how the running-task view is polled.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetSection {
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_poll_interval() -> String {
    "45s".to_string()
}

impl Default for FleetSection {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Validated configuration.
///
/// Constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so every
/// duration has been parsed and every slow-start pattern compiled.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub cluster: ClusterSection,
    pub launch: LaunchSettings,
    pub fleet: FleetSettings,
}

/// Cluster settings are used as-is after validation.
pub type ClusterSettings = ClusterSection;

impl ConfigFile {
    pub(crate) fn new_unchecked(
        cluster: ClusterSection,
        launch: LaunchSettings,
        fleet: FleetSettings,
    ) -> Self {
        Self {
            cluster,
            launch,
            fleet,
        }
    }
}

/// Tunables for one batch launch run.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub batch_size: usize,
    pub max_launch_retries: u32,
    pub max_retry_passes: u32,
    pub retry_delay: Duration,
    pub capacity_retry_delay: Duration,
    pub slow_start_warmup: Duration,
    pub inter_task_delay: Duration,
    pub inter_batch_delay: Duration,
    pub retry_pass_delay: Duration,
    pub slow_start: SlowStartMatcher,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_launch_retries: DEFAULT_MAX_LAUNCH_RETRIES,
            max_retry_passes: DEFAULT_MAX_RETRY_PASSES,
            retry_delay: DEFAULT_RETRY_DELAY,
            capacity_retry_delay: DEFAULT_CAPACITY_RETRY_DELAY,
            slow_start_warmup: DEFAULT_SLOW_START_WARMUP,
            inter_task_delay: DEFAULT_INTER_TASK_DELAY,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            retry_pass_delay: DEFAULT_RETRY_PASS_DELAY,
            slow_start: SlowStartMatcher::default(),
        }
    }
}

impl LaunchSettings {
    /// Convenience: whether `task_definition` belongs to a slow-start family.
    pub fn is_slow_start(&self, task_definition: &str) -> bool {
        self.slow_start.is_match(task_definition)
    }
}

/// Tunables for fleet polling.
#[derive(Debug, Clone)]
pub struct FleetSettings {
    pub max_results: u32,
    pub poll_interval: Duration,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Compiled set of slow-start task-definition patterns.
#[derive(Debug, Clone)]
pub struct SlowStartMatcher {
    patterns: Vec<String>,
    set: RegexSet,
}

impl SlowStartMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let set = RegexSet::new(&patterns)?;
        Ok(Self { patterns, set })
    }

    /// A matcher that treats no workload as slow-start.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    pub fn is_match(&self, task_definition: &str) -> bool {
        self.set.is_match(task_definition)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SlowStartMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SLOW_START_PATTERNS.iter().copied()).unwrap_or_else(|_| Self::none())
    }
}
