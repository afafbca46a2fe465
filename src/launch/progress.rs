// src/launch/progress.rs

//! Progress events and the reporter sink the controller writes them to.
//!
//! The caller-facing transport is abstracted behind [`ProgressReporter`].
//! The production implementation, [`ChannelReporter`], pushes events into an
//! unbounded Tokio channel: emission never blocks the controller, ordering is
//! that of a single channel, and once the receiving side is gone every
//! further `emit` is a silent no-op.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// What a progress line is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    RunStarted,
    BatchStarted,
    TaskLaunched,
    TaskFailed,
    TaskErrored,
    RetryPassStarted,
    Summary,
    Fatal,
}

impl ProgressKind {
    /// Events that describe one task attempt.
    pub fn is_per_task(self) -> bool {
        matches!(
            self,
            ProgressKind::TaskLaunched | ProgressKind::TaskFailed | ProgressKind::TaskErrored
        )
    }

    /// Events after which nothing else is emitted for the run.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressKind::Summary | ProgressKind::Fatal)
    }
}

/// A single human-readable status line, stamped at emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(kind: ProgressKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn run_started(total: usize, task_definition: &str) -> Self {
        Self::new(
            ProgressKind::RunStarted,
            format!("Starting launch of {total} tasks for {task_definition}"),
        )
    }

    pub fn batch_started(number: usize, of: usize, first: usize, last: usize) -> Self {
        Self::new(
            ProgressKind::BatchStarted,
            format!("Processing batch {number}/{of} ({first}-{last})"),
        )
    }

    pub fn task_launched(task_index: usize, total: usize) -> Self {
        Self::new(
            ProgressKind::TaskLaunched,
            format!("Successfully launched task {task_index}/{total}"),
        )
    }

    pub fn task_failed(task_index: usize, reason: &str) -> Self {
        Self::new(
            ProgressKind::TaskFailed,
            format!("Failed to launch task {task_index}: {reason}"),
        )
    }

    pub fn task_errored(task_index: usize, message: &str) -> Self {
        Self::new(
            ProgressKind::TaskErrored,
            format!("Error launching task {task_index}: {message}"),
        )
    }

    pub fn retry_pass_started(pending: usize, pass: u32, max_passes: u32) -> Self {
        Self::new(
            ProgressKind::RetryPassStarted,
            format!("Retrying {pending} failed tasks (Attempt {pass}/{max_passes})"),
        )
    }

    pub fn summary(successful: usize, total: usize, failed: usize) -> Self {
        let message = if failed == 0 {
            format!("Launched all {total} tasks.")
        } else {
            format!("Launched {successful}/{total} tasks; {failed} failed after all retries.")
        };
        Self::new(ProgressKind::Summary, message)
    }

    pub fn fatal(message: &str) -> Self {
        Self::new(ProgressKind::Fatal, format!("Error: {message}"))
    }
}

/// Sink for progress events.
///
/// `emit` is best effort: it must never fail or block indefinitely, and must
/// preserve emission order.
pub trait ProgressReporter: Send {
    fn emit(&mut self, event: ProgressEvent);

    /// Whether the consumer has gone away. The controller treats a closed
    /// reporter like a cancellation.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Collecting reporter, mostly useful in tests and for buffering.
impl ProgressReporter for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Reporter backed by an unbounded mpsc channel.
#[derive(Debug)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    closed: bool,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx, closed: false }
    }
}

impl ProgressReporter for ChannelReporter {
    fn emit(&mut self, event: ProgressEvent) {
        if self.closed {
            return;
        }
        if self.tx.send(event).is_err() {
            debug!("progress receiver dropped; discarding further events");
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed || self.tx.is_closed()
    }
}

/// Create a connected reporter / receiver pair.
pub fn progress_channel() -> (ChannelReporter, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelReporter::new(tx), rx)
}
