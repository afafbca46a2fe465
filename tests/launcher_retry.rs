// tests/launcher_retry.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use taskfleet::launch::{LaunchOutcome, TaskLauncher};
use taskfleet::provider::ProviderErrorKind;
use taskfleet_test_utils::builders::LaunchSettingsBuilder;
use taskfleet_test_utils::fake_api::{
    accepted, capacity_error, rejected, transient_error, unexpected_error, ScriptedLaunchApi,
};
use taskfleet_test_utils::init_tracing;

const DEF: &str = "render-worker:3";
const SLACK: Duration = Duration::from_millis(100);

fn launcher(api: Arc<ScriptedLaunchApi>) -> TaskLauncher<ScriptedLaunchApi> {
    TaskLauncher::new(api, "SYB", LaunchSettingsBuilder::new().build())
}

fn gaps(api: &ScriptedLaunchApi) -> Vec<Duration> {
    let calls = api.calls();
    calls.windows(2).map(|w| w[1].at - w[0].at).collect()
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_makes_one_call() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always_accept());

    let outcome = launcher(api.clone()).launch(DEF, 0).await.unwrap();

    assert!(outcome.is_launched());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(api.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn capacity_errors_wait_five_seconds_between_attempts() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::always(capacity_error()));
    let started = Instant::now();

    let outcome = launcher(api.clone()).launch(DEF, 0).await.unwrap();

    match outcome {
        LaunchOutcome::Failed { reason, attempts } => {
            assert_eq!(attempts, 4);
            assert!(reason.contains("Capacity"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(api.call_count(), 4);
    for gap in gaps(&api) {
        assert!(gap >= Duration::from_secs(5) && gap < Duration::from_secs(5) + SLACK);
    }
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(15) + SLACK);
}

#[tokio::test(start_paused = true)]
async fn other_errors_wait_two_seconds() {
    init_tracing();
    let api = Arc::new(ScriptedLaunchApi::new(
        vec![transient_error("ThrottlingException"), transient_error("timeout")],
        accepted(),
    ));

    let outcome = launcher(api.clone()).launch(DEF, 0).await.unwrap();

    assert!(outcome.is_launched());
    assert_eq!(outcome.attempts(), 3);
    for gap in gaps(&api) {
        assert!(gap >= Duration::from_secs(2) && gap < Duration::from_secs(2) + SLACK);
    }
}

#[tokio::test(start_paused = true)]
async fn retry_depth_limits_remaining_attempts() {
    let api = Arc::new(ScriptedLaunchApi::always(transient_error("boom")));

    let outcome = launcher(api.clone()).launch(DEF, 2).await.unwrap();
    assert_eq!(outcome.attempts(), 2);

    let api = Arc::new(ScriptedLaunchApi::always(transient_error("boom")));
    let outcome = launcher(api.clone()).launch(DEF, 3).await.unwrap();
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(
        outcome,
        LaunchOutcome::Failed {
            reason: "boom".to_string(),
            attempts: 1
        }
    );
}

#[tokio::test(start_paused = true)]
async fn rejection_returns_immediately() {
    let api = Arc::new(ScriptedLaunchApi::always(rejected("no task returned by provider")));

    let outcome = launcher(api.clone()).launch(DEF, 0).await.unwrap();

    assert_eq!(
        outcome,
        LaunchOutcome::Failed {
            reason: "no task returned by provider".to_string(),
            attempts: 1
        }
    );
    assert_eq!(api.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn unexpected_error_is_not_retried() {
    let api = Arc::new(ScriptedLaunchApi::always(unexpected_error("bad request")));

    let err = launcher(api.clone()).launch(DEF, 0).await.unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Unexpected);
    assert_eq!(err.to_string(), "bad request");
    assert_eq!(api.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_start_family_warms_up_before_the_call() {
    let api = Arc::new(ScriptedLaunchApi::always_accept());
    let started = Instant::now();

    launcher(api.clone()).launch("Video_Mix:7", 0).await.unwrap();

    let first = api.calls()[0].at - started;
    assert!(first >= Duration::from_secs(1) && first < Duration::from_secs(1) + SLACK);
}

#[tokio::test(start_paused = true)]
async fn cancellation_cuts_a_cooldown_short() {
    let cancel = CancellationToken::new();
    let hook_cancel = cancel.clone();
    let api = Arc::new(
        ScriptedLaunchApi::always(capacity_error()).with_hook(move |_| hook_cancel.cancel()),
    );
    let started = Instant::now();

    let outcome = launcher(api.clone())
        .launch_with_cancel(DEF, 0, &cancel)
        .await
        .unwrap();

    assert!(!outcome.is_launched());
    assert_eq!(api.call_count(), 1);
    assert!(started.elapsed() < SLACK);
}
