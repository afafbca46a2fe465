// src/launch/state.rs

//! Per-run bookkeeping owned by the controller.
//!
//! `BatchRunState` is plain data: no Tokio types, no IO. The controller is
//! its only writer and processes tasks sequentially, so there is no locking.

use std::collections::BTreeMap;
use std::time::Duration;

/// Result of one attempt at one task index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// 1-based, stable across retry passes.
    pub task_index: usize,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

impl TaskOutcome {
    pub fn success(task_index: usize) -> Self {
        Self {
            task_index,
            succeeded: true,
            failure_reason: None,
        }
    }

    pub fn failure(task_index: usize, reason: impl Into<String>) -> Self {
        Self {
            task_index,
            succeeded: false,
            failure_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchRunState {
    total_requested: usize,
    successful: usize,
    pending_failed: Vec<usize>,
    current_retry_pass: u32,
    max_retry_passes: u32,
    /// Most recent outcome per task index.
    latest: BTreeMap<usize, TaskOutcome>,
}

impl BatchRunState {
    pub fn new(total_requested: usize, max_retry_passes: u32) -> Self {
        Self {
            total_requested,
            successful: 0,
            pending_failed: Vec::new(),
            current_retry_pass: 0,
            max_retry_passes,
            latest: BTreeMap::new(),
        }
    }

    /// Record the outcome of an attempt.
    ///
    /// A success removes the index from the pending failures; a failure adds
    /// it (once) in the order first seen.
    pub fn record(&mut self, outcome: TaskOutcome) {
        let index = outcome.task_index;
        let previously_succeeded = self.latest.get(&index).is_some_and(|o| o.succeeded);

        if outcome.succeeded {
            if !previously_succeeded {
                self.successful += 1;
            }
            self.pending_failed.retain(|&i| i != index);
        } else if !self.pending_failed.contains(&index) {
            self.pending_failed.push(index);
        }

        self.latest.insert(index, outcome);
    }

    /// Whether another retry pass may start.
    pub fn can_retry(&self) -> bool {
        !self.pending_failed.is_empty() && self.current_retry_pass < self.max_retry_passes
    }

    /// Start the next retry pass, returning the indices to re-attempt.
    pub fn begin_retry_pass(&mut self) -> Option<Vec<usize>> {
        if !self.can_retry() {
            return None;
        }
        self.current_retry_pass += 1;
        Some(self.pending_failed.clone())
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn pending_failed(&self) -> &[usize] {
        &self.pending_failed
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_failed.is_empty()
    }

    pub fn current_retry_pass(&self) -> u32 {
        self.current_retry_pass
    }

    pub fn latest_outcome(&self, task_index: usize) -> Option<&TaskOutcome> {
        self.latest.get(&task_index)
    }

    pub fn into_report(self, cancelled: bool, elapsed: Duration) -> RunReport {
        RunReport {
            total_requested: self.total_requested,
            successful: self.successful,
            failed_indices: self.pending_failed,
            retry_passes: self.current_retry_pass,
            cancelled,
            elapsed,
        }
    }
}

/// Final account of a launch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub total_requested: usize,
    pub successful: usize,
    pub failed_indices: Vec<usize>,
    pub retry_passes: u32,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.failed_indices.len()
    }

    pub fn all_launched(&self) -> bool {
        !self.cancelled && self.successful == self.total_requested
    }
}
