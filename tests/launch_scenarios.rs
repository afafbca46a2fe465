// tests/launch_scenarios.rs

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use taskfleet::launch::{BatchController, ProgressKind};
use taskfleet::types::LaunchRequest;
use taskfleet_test_utils::builders::LaunchSettingsBuilder;
use taskfleet_test_utils::fake_api::{
    accepted, capacity_error, rejected, transient_error, unexpected_error, ScriptedLaunchApi,
};
use taskfleet_test_utils::init_tracing;
use taskfleet_test_utils::recording::RecordingReporter;

const DEF: &str = "render-worker:3";

fn controller(api: Arc<ScriptedLaunchApi>) -> BatchController<ScriptedLaunchApi> {
    BatchController::from_api(api, "SYB", LaunchSettingsBuilder::new().build())
}

#[tokio::test(start_paused = true)]
async fn three_tasks_all_succeed() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 3), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(
        reporter.messages(),
        vec![
            "Starting launch of 3 tasks for render-worker:3",
            "Processing batch 1/1 (1-3)",
            "Successfully launched task 1/3",
            "Successfully launched task 2/3",
            "Successfully launched task 3/3",
            "Launched all 3 tasks.",
        ]
    );
    assert_eq!(report.successful, 3);
    assert!(report.all_launched());
    assert_eq!(report.retry_passes, 0);
    assert!(!report.cancelled);
    assert_eq!(api.call_count(), 3);
    assert!(api.calls().iter().all(|c| c.cluster == "SYB" && c.task_definition == DEF));
}

#[tokio::test(start_paused = true)]
async fn persistent_capacity_failure_exhausts_retry_passes() {
    init_tracing();
    // Task 1: four capacity errors (first attempt + 3 retries). Task 2: accepted.
    // Every later call (the retry passes for task 1) hits capacity again.
    let mut script = vec![capacity_error(); 4];
    script.push(accepted());
    let api = Arc::new(ScriptedLaunchApi::new(script, capacity_error()));
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 2), &mut reporter, &CancellationToken::new())
        .await;

    let failed = "Failed to launch task 1: Capacity is unavailable at this time";
    assert_eq!(
        reporter.messages_of(&[
            ProgressKind::TaskLaunched,
            ProgressKind::TaskFailed,
            ProgressKind::RetryPassStarted,
            ProgressKind::Summary,
        ]),
        vec![
            failed,
            "Successfully launched task 2/2",
            "Retrying 1 failed tasks (Attempt 1/3)",
            failed,
            "Retrying 1 failed tasks (Attempt 2/3)",
            failed,
            "Retrying 1 failed tasks (Attempt 3/3)",
            failed,
            "Launched 1/2 tasks; 1 failed after all retries.",
        ]
    );
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed_indices, vec![1]);
    assert_eq!(report.retry_passes, 3);
    // 4 + 1 in the first pass, then 4 per retry pass.
    assert_eq!(api.call_count(), 17);
}

#[tokio::test(start_paused = true)]
async fn failure_recovered_in_retry_pass() {
    init_tracing();
    let mut script = vec![transient_error("throttled"); 4];
    script.push(accepted()); // task 2
    script.push(accepted()); // task 1, retry pass 1
    let api = Arc::new(ScriptedLaunchApi::new(script, transient_error("unused")));
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 2), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(report.successful, 2);
    assert!(report.failed_indices.is_empty());
    assert_eq!(report.retry_passes, 1);
    assert_eq!(
        reporter.per_task_messages(),
        vec![
            "Failed to launch task 1: throttled",
            "Successfully launched task 2/2",
            "Successfully launched task 1/2",
        ]
    );
    assert_eq!(reporter.messages().last().unwrap(), "Launched all 2 tasks.");
}

#[tokio::test(start_paused = true)]
async fn sixty_tasks_run_in_three_batches() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 60), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(
        reporter.messages_of(&[ProgressKind::BatchStarted]),
        vec![
            "Processing batch 1/3 (1-25)",
            "Processing batch 2/3 (26-50)",
            "Processing batch 3/3 (51-60)",
        ]
    );
    let per_task = reporter.per_task_messages();
    assert_eq!(per_task.len(), 60);
    assert_eq!(per_task[0], "Successfully launched task 1/60");
    assert_eq!(per_task[59], "Successfully launched task 60/60");
    assert_eq!(report.successful, 60);
}

#[tokio::test(start_paused = true)]
async fn rejection_is_not_retried_in_place() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::new(
        vec![rejected("RESOURCE:MEMORY")],
        accepted(),
    ));
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 1), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(
        reporter.per_task_messages(),
        vec![
            "Failed to launch task 1: RESOURCE:MEMORY",
            "Successfully launched task 1/1",
        ]
    );
    // One call for the rejection, one in the retry pass.
    assert_eq!(api.call_count(), 2);
    assert!(report.all_launched());
}

#[tokio::test(start_paused = true)]
async fn unexpected_error_is_reported_and_run_continues() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::new(
        vec![unexpected_error("missing network configuration")],
        accepted(),
    ));
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 2), &mut reporter, &CancellationToken::new())
        .await;

    let events = reporter.events();
    let errored: Vec<_> = events
        .iter()
        .filter(|e| e.kind == ProgressKind::TaskErrored)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        errored,
        vec!["Error launching task 1: missing network configuration"]
    );
    assert_eq!(report.successful, 2);
    assert_eq!(events.last().unwrap().kind, ProgressKind::Summary);
}

#[tokio::test]
async fn zero_count_emits_single_fatal_event() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 0), &mut reporter, &CancellationToken::new())
        .await;

    let events = reporter.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ProgressKind::Fatal);
    assert_eq!(
        events[0].message,
        "Error: Invalid launch request: count must be >= 1 (got 0)"
    );
    assert_eq!(api.call_count(), 0);
    assert_eq!(report.total_requested, 0);
}

#[tokio::test]
async fn empty_task_definition_is_fatal() {
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let mut events = Vec::new();

    controller(api.clone())
        .run(&LaunchRequest::new("  ", 3), &mut events, &CancellationToken::new())
        .await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ProgressKind::Fatal);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn small_batches_with_zero_delays() {
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let settings = LaunchSettingsBuilder::new().no_delays().batch_size(2).build();
    let controller = BatchController::from_api(api.clone(), "SYB", settings);
    let mut reporter = RecordingReporter::new();

    controller
        .run(&LaunchRequest::new(DEF, 5), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(
        reporter.messages_of(&[ProgressKind::BatchStarted]),
        vec![
            "Processing batch 1/3 (1-2)",
            "Processing batch 2/3 (3-4)",
            "Processing batch 3/3 (5-5)",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn permanent_failure_uses_every_retry_pass() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always(capacity_error()));
    let mut reporter = RecordingReporter::new();

    let report = controller(api.clone())
        .run(&LaunchRequest::new(DEF, 3), &mut reporter, &CancellationToken::new())
        .await;

    assert_eq!(report.successful, 0);
    assert_eq!(report.failed_indices, vec![1, 2, 3]);
    assert_eq!(report.retry_passes, 3);
    assert_eq!(
        reporter.messages_of(&[ProgressKind::RetryPassStarted]),
        vec![
            "Retrying 3 failed tasks (Attempt 1/3)",
            "Retrying 3 failed tasks (Attempt 2/3)",
            "Retrying 3 failed tasks (Attempt 3/3)",
        ]
    );
    assert_eq!(
        reporter.messages().last().unwrap(),
        "Launched 0/3 tasks; 3 failed after all retries."
    );
    // 3 tasks x 4 attempts, in the first pass and each of the 3 retry passes.
    assert_eq!(api.call_count(), 48);
}
