// src/provider/mod.rs

//! Orchestration provider abstraction.
//!
//! The launcher and the fleet reader talk to a `TaskLaunchApi` /
//! `TaskStatusApi` instead of a concrete cloud SDK client. The client is
//! injected at construction time, which makes it easy to swap in scripted
//! fakes in tests while keeping the production adapter in [`ecs`].
//!
//! Both traits deliberately stay wire-neutral: a launch either comes back as
//! a [`LaunchReply`] or as a classified [`ProviderError`], and the status API
//! only hands out plain [`TaskDescription`] records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod ecs;

pub use ecs::EcsClient;

/// How a failed provider call should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Temporary resource exhaustion; retried after the long cooldown.
    Capacity,
    /// Any other provider-side failure; retried after the short cooldown.
    Transient,
    /// Not a provider failure at all (bad local setup, broken request).
    /// Never retried in place.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn capacity(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Capacity,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unexpected,
            message: message.into(),
        }
    }

    /// Classify a raw provider error message.
    ///
    /// Capacity errors are recognised by the word "capacity" anywhere in the
    /// message (e.g. "Capacity is unavailable at this time").
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("capacity") {
            Self::capacity(message)
        } else {
            Self::transient(message)
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::Capacity | ProviderErrorKind::Transient
        )
    }
}

/// Answer to a single launch request that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchReply {
    /// The provider accepted the task.
    Accepted { task_arn: Option<String> },
    /// The provider answered but refused to place the task.
    Rejected { reason: String },
}

/// One task as returned by the describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescription {
    pub task_arn: String,
    pub task_definition_arn: String,
    pub last_status: String,
    pub desired_status: Option<String>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Launch exactly one task instance.
///
/// Implementations must tolerate being called again after an ambiguous
/// failure: launches are at-least-once, so a timed-out call that actually
/// succeeded may produce a duplicate task.
#[async_trait]
pub trait TaskLaunchApi: Send + Sync {
    async fn launch(
        &self,
        cluster: &str,
        task_definition: &str,
    ) -> Result<LaunchReply, ProviderError>;
}

/// Read-only view of the tasks running on a cluster.
#[async_trait]
pub trait TaskStatusApi: Send + Sync {
    /// List identifiers of running tasks, at most `max_results`.
    async fn list_running(
        &self,
        cluster: &str,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError>;

    /// Describe the given tasks.
    async fn describe(
        &self,
        cluster: &str,
        task_ids: &[String],
    ) -> Result<Vec<TaskDescription>, ProviderError>;
}
