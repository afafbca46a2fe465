#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Utc};
use taskfleet::config::{LaunchSettings, SlowStartMatcher};
use taskfleet::provider::TaskDescription;

/// Builder for `LaunchSettings` to simplify test setup.
///
/// Starts from the production defaults (25 per batch, 3 retries, 3 passes,
/// 2s/5s cooldowns, `Video_Mix` slow-start).
pub struct LaunchSettingsBuilder {
    settings: LaunchSettings,
}

impl LaunchSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: LaunchSettings::default(),
        }
    }

    /// Zero every cooldown and delay.
    pub fn no_delays(mut self) -> Self {
        let s = &mut self.settings;
        s.retry_delay = Duration::ZERO;
        s.capacity_retry_delay = Duration::ZERO;
        s.slow_start_warmup = Duration::ZERO;
        s.inter_task_delay = Duration::ZERO;
        s.inter_batch_delay = Duration::ZERO;
        s.retry_pass_delay = Duration::ZERO;
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.settings.batch_size = n;
        self
    }

    pub fn max_launch_retries(mut self, n: u32) -> Self {
        self.settings.max_launch_retries = n;
        self
    }

    pub fn max_retry_passes(mut self, n: u32) -> Self {
        self.settings.max_retry_passes = n;
        self
    }

    pub fn retry_pass_delay(mut self, d: Duration) -> Self {
        self.settings.retry_pass_delay = d;
        self
    }

    pub fn slow_start(mut self, patterns: &[&str]) -> Self {
        self.settings.slow_start =
            SlowStartMatcher::new(patterns.iter().copied()).expect("valid slow-start pattern");
        self
    }

    pub fn no_slow_start(mut self) -> Self {
        self.settings.slow_start = SlowStartMatcher::none();
        self
    }

    pub fn build(self) -> LaunchSettings {
        self.settings
    }
}

impl Default for LaunchSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskDescription`.
pub struct TaskDescriptionBuilder {
    task: TaskDescription,
}

impl TaskDescriptionBuilder {
    /// `family:revision` becomes a full task-definition ARN.
    pub fn new(task_id: &str, family_revision: &str) -> Self {
        Self {
            task: TaskDescription {
                task_arn: format!("arn:aws:ecs:us-west-1:000000000000:task/SYB/{task_id}"),
                task_definition_arn: format!(
                    "arn:aws:ecs:us-west-1:000000000000:task-definition/{family_revision}"
                ),
                last_status: "RUNNING".to_string(),
                desired_status: Some("RUNNING".to_string()),
                cpu: Some("1024".to_string()),
                memory: Some("2048".to_string()),
                created_at: None,
            },
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.task.last_status = status.to_string();
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.created_at = Some(at);
        self
    }

    pub fn build(self) -> TaskDescription {
        self.task
    }
}
