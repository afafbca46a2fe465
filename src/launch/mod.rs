// src/launch/mod.rs

//! Batch task launching.
//!
//! - [`launcher`] launches one task with bounded in-place retries.
//! - [`batch`] splits a request into fixed-size batches (pure).
//! - [`state`] holds per-run bookkeeping and the final report (pure).
//! - [`progress`] defines progress events and the reporter sink.
//! - [`controller`] drives batches, retry passes and progress emission.
//! - [`session`] spawns a run and exposes it as a live event stream.

pub mod batch;
pub mod controller;
pub mod launcher;
pub mod progress;
pub mod session;
pub mod state;

pub use batch::{batch_count, plan_batches, Batch};
pub use controller::BatchController;
pub use launcher::{LaunchOutcome, TaskLauncher};
pub use progress::{progress_channel, ChannelReporter, ProgressEvent, ProgressKind, ProgressReporter};
pub use session::{start_run, LaunchSession};
pub use state::{BatchRunState, RunReport, TaskOutcome};
