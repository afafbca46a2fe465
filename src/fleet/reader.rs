// src/fleet/reader.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{Result, TaskfleetError};
use crate::fleet::grouping::{group_by_family, task_definition_family, TaskGroup};
use crate::provider::{TaskDescription, TaskStatusApi};
use crate::types::TaskStatus;

/// One running task, recomputed from scratch on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningTaskSnapshot {
    pub task_arn: String,
    pub task_definition_family: String,
    pub last_status: TaskStatus,
    pub desired_status: Option<String>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<TaskDescription> for RunningTaskSnapshot {
    fn from(desc: TaskDescription) -> Self {
        Self {
            task_definition_family: task_definition_family(&desc.task_definition_arn).to_string(),
            last_status: TaskStatus::from_provider(&desc.last_status),
            task_arn: desc.task_arn,
            desired_status: desc.desired_status,
            cpu: desc.cpu,
            memory: desc.memory,
            created_at: desc.created_at,
        }
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSnapshot {
    pub tasks: Vec<RunningTaskSnapshot>,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
}

impl FleetSnapshot {
    pub fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            count: 0,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn into_report(self) -> FleetReport {
        FleetReport {
            groups: group_by_family(&self.tasks),
            count: self.count,
            fetched_at: self.fetched_at,
        }
    }
}

/// Grouped answer to "what is running right now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetReport {
    pub groups: Vec<TaskGroup>,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Polls the status API for the tasks of one cluster.
///
/// Holds no state between polls, so any number of readers can run next to
/// launch runs without coordination.
pub struct FleetStatusReader<S: TaskStatusApi> {
    api: Arc<S>,
    cluster: String,
    max_results: u32,
}

impl<S: TaskStatusApi> FleetStatusReader<S> {
    pub fn new(api: Arc<S>, cluster: impl Into<String>, max_results: u32) -> Self {
        Self {
            api,
            cluster: cluster.into(),
            max_results,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// List, then describe. All-or-nothing: any failed call fails the poll.
    pub async fn poll(&self) -> Result<FleetSnapshot> {
        let task_ids = self
            .api
            .list_running(&self.cluster, self.max_results)
            .await
            .map_err(|e| {
                warn!(cluster = %self.cluster, error = %e, "listing tasks failed");
                TaskfleetError::Provider(e.message)
            })?;

        debug!(cluster = %self.cluster, task_count = task_ids.len(), "listed running tasks");

        if task_ids.is_empty() {
            return Ok(FleetSnapshot::empty());
        }

        let described = self
            .api
            .describe(&self.cluster, &task_ids)
            .await
            .map_err(|e| {
                warn!(cluster = %self.cluster, error = %e, "describing tasks failed");
                TaskfleetError::Provider(e.message)
            })?;

        let tasks: Vec<RunningTaskSnapshot> =
            described.into_iter().map(RunningTaskSnapshot::from).collect();

        for task in &tasks {
            debug!(
                family = %task.task_definition_family,
                task_arn = %task.task_arn,
                status = %task.last_status,
                "running task"
            );
        }

        Ok(FleetSnapshot {
            count: tasks.len(),
            tasks,
            fetched_at: Utc::now(),
        })
    }

    /// Poll and group by task-definition family.
    pub async fn poll_grouped(&self) -> Result<FleetReport> {
        Ok(self.poll().await?.into_report())
    }
}
