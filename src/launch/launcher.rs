// src/launch/launcher.rs

//! Single-task launcher with bounded in-place retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LaunchSettings;
use crate::fleet::task_definition_family;
use crate::provider::{LaunchReply, ProviderError, ProviderErrorKind, TaskLaunchApi};

/// Definite result of one launcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched {
        task_arn: Option<String>,
        attempts: u32,
    },
    Failed {
        reason: String,
        attempts: u32,
    },
}

impl LaunchOutcome {
    pub fn is_launched(&self) -> bool {
        matches!(self, LaunchOutcome::Launched { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            LaunchOutcome::Launched { attempts, .. } | LaunchOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Launches one task instance at a time against a cluster.
///
/// Retries are an explicit loop: capacity errors wait
/// `capacity_retry_delay`, other provider errors wait `retry_delay`, and at
/// most `max_launch_retries` retries follow the first attempt. Callers never
/// see the intermediate failures.
pub struct TaskLauncher<A: TaskLaunchApi> {
    api: Arc<A>,
    cluster: String,
    settings: LaunchSettings,
}

impl<A: TaskLaunchApi> TaskLauncher<A> {
    pub fn new(api: Arc<A>, cluster: impl Into<String>, settings: LaunchSettings) -> Self {
        Self {
            api,
            cluster: cluster.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Launch one task, retrying transient provider errors in place.
    ///
    /// `retry_depth` is the number of in-place retries already spent; a depth
    /// at or above `max_launch_retries` leaves a single attempt.
    ///
    /// Returns `Err` only for [`ProviderErrorKind::Unexpected`] errors, which
    /// are not retried.
    pub async fn launch(
        &self,
        task_definition: &str,
        retry_depth: u32,
    ) -> Result<LaunchOutcome, ProviderError> {
        self.launch_with_cancel(task_definition, retry_depth, &CancellationToken::new())
            .await
    }

    /// Like [`launch`](Self::launch), but stops waiting on cooldowns once
    /// `cancel` fires. A call already sent to the provider is never aborted.
    pub async fn launch_with_cancel(
        &self,
        task_definition: &str,
        retry_depth: u32,
        cancel: &CancellationToken,
    ) -> Result<LaunchOutcome, ProviderError> {
        if self.settings.is_slow_start(task_definition)
            && !cooldown(self.settings.slow_start_warmup, cancel).await
        {
            return Ok(LaunchOutcome::Failed {
                reason: "cancelled before launch".to_string(),
                attempts: 0,
            });
        }

        let family = task_definition_family(task_definition);
        let mut depth = retry_depth;
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(
                cluster = %self.cluster,
                family,
                attempt = attempts,
                "sending launch request"
            );

            let err = match self.api.launch(&self.cluster, task_definition).await {
                Ok(LaunchReply::Accepted { task_arn }) => {
                    info!(family, attempts, "task launched");
                    debug!(
                        family,
                        task_arn = task_arn.as_deref().unwrap_or("<unknown>"),
                        "launch acknowledged"
                    );
                    return Ok(LaunchOutcome::Launched { task_arn, attempts });
                }
                Ok(LaunchReply::Rejected { reason }) => {
                    warn!(family, %reason, attempts, "provider rejected launch");
                    return Ok(LaunchOutcome::Failed { reason, attempts });
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                warn!(family, error = %err, "unexpected launch error; not retrying");
                return Err(err);
            }

            if depth >= self.settings.max_launch_retries {
                warn!(
                    family,
                    error = %err,
                    attempts,
                    "launch retries exhausted"
                );
                return Ok(LaunchOutcome::Failed {
                    reason: err.message,
                    attempts,
                });
            }

            let delay = self.retry_delay_for(&err);
            warn!(
                family,
                error = %err,
                attempts,
                delay_ms = delay.as_millis() as u64,
                "transient launch error; retrying"
            );

            if !cooldown(delay, cancel).await {
                return Ok(LaunchOutcome::Failed {
                    reason: err.message,
                    attempts,
                });
            }
            depth += 1;
        }
    }

    fn retry_delay_for(&self, err: &ProviderError) -> Duration {
        match err.kind {
            ProviderErrorKind::Capacity => self.settings.capacity_retry_delay,
            _ => self.settings.retry_delay,
        }
    }
}

/// Sleep for `delay` unless `cancel` fires first.
///
/// Returns `false` if the run was cancelled (before or during the wait).
pub(crate) async fn cooldown(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}
