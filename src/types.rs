use std::fmt;

use serde::Serialize;

use crate::errors::{Result, TaskfleetError};

/// A request to launch `total_count` instances of one task definition.
///
/// The request is treated as immutable once a run starts; the controller only
/// ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    pub task_definition: String,
    pub total_count: usize,
}

impl LaunchRequest {
    pub fn new(task_definition: impl Into<String>, total_count: usize) -> Self {
        Self {
            task_definition: task_definition.into(),
            total_count,
        }
    }

    /// Reject requests that cannot start a run at all.
    pub fn validate(&self) -> Result<()> {
        if self.task_definition.trim().is_empty() {
            return Err(TaskfleetError::InvalidRequest(
                "task definition must not be empty".to_string(),
            ));
        }
        if self.total_count == 0 {
            return Err(TaskfleetError::InvalidRequest(
                "count must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Last known status of a task as reported by the orchestrator.
///
/// Anything that is not one of the three states we care about (e.g.
/// `PROVISIONING`, `DEPROVISIONING`) collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Stopped,
    Other,
}

impl TaskStatus {
    pub fn from_provider(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => TaskStatus::Pending,
            "RUNNING" => TaskStatus::Running,
            "STOPPED" => TaskStatus::Stopped,
            _ => TaskStatus::Other,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Stopped => "STOPPED",
            TaskStatus::Other => "OTHER",
        };
        f.pad(s)
    }
}
