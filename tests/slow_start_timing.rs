// tests/slow_start_timing.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use taskfleet::launch::BatchController;
use taskfleet::types::LaunchRequest;
use taskfleet_test_utils::builders::LaunchSettingsBuilder;
use taskfleet_test_utils::fake_api::ScriptedLaunchApi;
use taskfleet_test_utils::init_tracing;

const SLACK: Duration = Duration::from_millis(100);

async fn timed_run(task_definition: &str, count: usize) -> (Duration, Arc<ScriptedLaunchApi>) {
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let controller =
        BatchController::from_api(api.clone(), "SYB", LaunchSettingsBuilder::new().build());
    let mut events = Vec::new();
    let started = Instant::now();

    let report = controller
        .run(
            &LaunchRequest::new(task_definition, count),
            &mut events,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.successful, count);
    (started.elapsed(), api)
}

#[tokio::test(start_paused = true)]
async fn slow_start_workload_spends_five_seconds_for_three_tasks() {
    init_tracing();
    // 3 x 1s warm-up plus 2 x 1s between tasks; nothing after the last one.
    let (elapsed, api) = timed_run("Video_Mix:12", 3).await;

    assert!(
        elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(5) + SLACK,
        "elapsed {elapsed:?}"
    );
    let calls = api.calls();
    assert_eq!(calls.len(), 3);
    let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1].at - w[0].at).collect();
    for gap in gaps {
        assert!(gap >= Duration::from_secs(2) && gap < Duration::from_secs(2) + SLACK);
    }
}

#[tokio::test(start_paused = true)]
async fn ordinary_workload_has_no_pacing() {
    init_tracing();
    let (elapsed, _) = timed_run("render-worker:3", 3).await;

    assert!(elapsed < SLACK, "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn inter_batch_delay_applies_between_batches_only() {
    init_tracing();
    // 30 tasks at 25 per batch: one 1s pause between the two batches.
    let (elapsed, _) = timed_run("render-worker:3", 30).await;

    assert!(
        elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(1) + SLACK,
        "elapsed {elapsed:?}"
    );
}
