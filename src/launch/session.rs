// src/launch/session.rs

//! The caller-facing "start a run" operation.
//!
//! [`start_run`] spawns the controller on the Tokio runtime and hands back a
//! [`LaunchSession`]: an ordered event receiver that closes after the final
//! line, a cancellation handle, and the join handle yielding the
//! [`RunReport`]. Dropping the receiver counts as the caller disconnecting
//! and cancels the run.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::provider::TaskLaunchApi;
use crate::types::LaunchRequest;

use super::controller::BatchController;
use super::progress::{ChannelReporter, ProgressEvent};
use super::state::RunReport;

pub struct LaunchSession {
    pub events: mpsc::UnboundedReceiver<ProgressEvent>,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<RunReport>,
}

impl LaunchSession {
    /// Receive the next progress event; `None` once the run has finished.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Request cancellation (same effect as the caller disconnecting).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Spawn a launch run for `request` and return its live session.
pub fn start_run<A>(controller: Arc<BatchController<A>>, request: LaunchRequest) -> LaunchSession
where
    A: TaskLaunchApi + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let cancel = CancellationToken::new();
    let finished = CancellationToken::new();

    // Watch for the receiver going away so cooldowns end promptly.
    {
        let tx = tx.clone();
        let cancel = cancel.clone();
        let finished = finished.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("progress consumer disconnected; cancelling run");
                    cancel.cancel();
                }
                _ = finished.cancelled() => {}
            }
        });
    }

    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        // Fires on unwind too, so the watcher always releases its sender.
        let _finished = finished.drop_guard();
        let mut reporter = ChannelReporter::new(tx);
        controller.run(&request, &mut reporter, &run_cancel).await
    });

    LaunchSession {
        events: rx,
        cancel,
        handle,
    }
}
