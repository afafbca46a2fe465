// src/launch/controller.rs

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::LaunchSettings;
use crate::errors::Result;
use crate::provider::TaskLaunchApi;
use crate::types::LaunchRequest;

use super::batch::{plan_batches, retry_batch, Batch};
use super::launcher::{cooldown, LaunchOutcome, TaskLauncher};
use super::progress::{ProgressEvent, ProgressReporter};
use super::state::{BatchRunState, RunReport, TaskOutcome};

/// Drives one [`LaunchRequest`] to completion.
///
/// Tasks are launched strictly one after another (the provider throttles
/// per cluster), batches and retry passes run in order, and every progress
/// event is emitted in the same order the work happens.
///
/// Cancellation is cooperative: the controller checks the token (and
/// whether the reporter is still connected) between task attempts and
/// wakes early from any cooldown. A launch already in flight completes but
/// its result is not reported.
pub struct BatchController<A: TaskLaunchApi> {
    launcher: TaskLauncher<A>,
}

/// Borrowed context for one run.
struct RunContext<'a, R: ProgressReporter + ?Sized> {
    request: &'a LaunchRequest,
    reporter: &'a mut R,
    cancel: &'a CancellationToken,
    state: BatchRunState,
}

impl<R: ProgressReporter + ?Sized> RunContext<'_, R> {
    fn stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.reporter.is_closed()
    }

    fn emit(&mut self, event: ProgressEvent) {
        if self.stopped() {
            return;
        }
        self.reporter.emit(event);
    }
}

impl<A: TaskLaunchApi> BatchController<A> {
    pub fn new(launcher: TaskLauncher<A>) -> Self {
        Self { launcher }
    }

    /// Convenience constructor wiring a launcher from its parts.
    pub fn from_api(api: Arc<A>, cluster: impl Into<String>, settings: LaunchSettings) -> Self {
        Self::new(TaskLauncher::new(api, cluster, settings))
    }

    pub fn settings(&self) -> &LaunchSettings {
        self.launcher.settings()
    }

    /// Run the whole request and return the final report.
    ///
    /// Never fails: provider errors become task failures, and anything that
    /// prevents the run from proceeding is reported as a single `Fatal`
    /// progress event.
    pub async fn run<R>(
        &self,
        request: &LaunchRequest,
        reporter: &mut R,
        cancel: &CancellationToken,
    ) -> RunReport
    where
        R: ProgressReporter + ?Sized,
    {
        let started = Instant::now();
        let mut ctx = RunContext {
            request,
            reporter,
            cancel,
            state: BatchRunState::new(
                request.total_count,
                self.settings().max_retry_passes,
            ),
        };

        info!(
            task_definition = %request.task_definition,
            total = request.total_count,
            cluster = %self.launcher.cluster(),
            "launch run started"
        );

        if let Err(err) = self.drive(&mut ctx).await {
            error!(error = %err, "launch run aborted");
            ctx.emit(ProgressEvent::fatal(&err.to_string()));
        }

        let cancelled = ctx.stopped();
        let report = ctx.state.into_report(cancelled, started.elapsed());

        info!(
            successful = report.successful,
            failed = report.failed(),
            retry_passes = report.retry_passes,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "launch run finished"
        );

        report
    }

    async fn drive<R>(&self, ctx: &mut RunContext<'_, R>) -> Result<()>
    where
        R: ProgressReporter + ?Sized,
    {
        ctx.request.validate()?;
        let settings = self.settings();
        let batches = plan_batches(ctx.request.total_count, settings.batch_size)?;

        ctx.emit(ProgressEvent::run_started(
            ctx.request.total_count,
            &ctx.request.task_definition,
        ));

        let batch_total = batches.len();
        for batch in &batches {
            if ctx.stopped() {
                return Ok(());
            }

            ctx.emit(ProgressEvent::batch_started(
                batch.number,
                batch_total,
                batch.first_index().unwrap_or_default(),
                batch.last_index().unwrap_or_default(),
            ));

            if !self.process_batch(ctx, batch).await {
                return Ok(());
            }

            if batch.number < batch_total && !cooldown(settings.inter_batch_delay, ctx.cancel).await
            {
                return Ok(());
            }
        }

        while !ctx.stopped() {
            let Some(pending) = ctx.state.begin_retry_pass() else {
                break;
            };
            let pass = ctx.state.current_retry_pass();
            debug!(pass, pending = pending.len(), "starting retry pass");

            ctx.emit(ProgressEvent::retry_pass_started(
                pending.len(),
                pass,
                settings.max_retry_passes,
            ));

            if !self.process_batch(ctx, &retry_batch(&pending)).await {
                return Ok(());
            }

            if ctx.state.can_retry() && !cooldown(settings.retry_pass_delay, ctx.cancel).await {
                return Ok(());
            }
        }

        if !ctx.stopped() {
            ctx.emit(ProgressEvent::summary(
                ctx.state.successful(),
                ctx.request.total_count,
                ctx.state.pending_failed().len(),
            ));
        }

        Ok(())
    }

    /// Attempt every task of `batch` in order.
    ///
    /// Returns `false` once the run has been cancelled.
    async fn process_batch<R>(&self, ctx: &mut RunContext<'_, R>, batch: &Batch) -> bool
    where
        R: ProgressReporter + ?Sized,
    {
        let settings = self.settings();
        let task_definition = ctx.request.task_definition.as_str();
        let total = ctx.request.total_count;
        let slow_start = settings.is_slow_start(task_definition);

        for (pos, &task_index) in batch.indices.iter().enumerate() {
            if ctx.stopped() {
                return false;
            }

            let result = self
                .launcher
                .launch_with_cancel(task_definition, 0, ctx.cancel)
                .await;

            let (outcome, event) = match result {
                Ok(LaunchOutcome::Launched { .. }) => (
                    TaskOutcome::success(task_index),
                    ProgressEvent::task_launched(task_index, total),
                ),
                Ok(LaunchOutcome::Failed { reason, .. }) => {
                    let event = ProgressEvent::task_failed(task_index, &reason);
                    (TaskOutcome::failure(task_index, reason), event)
                }
                Err(err) => (
                    TaskOutcome::failure(task_index, err.message.clone()),
                    ProgressEvent::task_errored(task_index, &err.message),
                ),
            };

            ctx.state.record(outcome);

            if ctx.stopped() {
                debug!(task_index, "run cancelled during launch; result not reported");
                return false;
            }
            ctx.emit(event);

            let more_in_batch = pos + 1 < batch.len();
            if slow_start
                && more_in_batch
                && !cooldown(settings.inter_task_delay, ctx.cancel).await
            {
                return false;
            }
        }

        true
    }
}
