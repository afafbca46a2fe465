use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use taskfleet::provider::{
    LaunchReply, ProviderError, TaskDescription, TaskLaunchApi, TaskStatusApi,
};

pub type LaunchResponse = Result<LaunchReply, ProviderError>;

/// Convenience constructors for scripted responses.
pub fn accepted() -> LaunchResponse {
    Ok(LaunchReply::Accepted {
        task_arn: Some("arn:aws:ecs:us-west-1:000000000000:task/test/fake".to_string()),
    })
}

pub fn rejected(reason: &str) -> LaunchResponse {
    Ok(LaunchReply::Rejected {
        reason: reason.to_string(),
    })
}

pub fn capacity_error() -> LaunchResponse {
    Err(ProviderError::capacity("Capacity is unavailable at this time"))
}

pub fn transient_error(msg: &str) -> LaunchResponse {
    Err(ProviderError::transient(msg))
}

pub fn unexpected_error(msg: &str) -> LaunchResponse {
    Err(ProviderError::unexpected(msg))
}

/// A single recorded launch call.
#[derive(Debug, Clone)]
pub struct LaunchCall {
    pub cluster: String,
    pub task_definition: String,
    pub at: Instant,
}

type CallHook = Box<dyn Fn(usize) + Send + Sync>;

/// A launch API that:
/// - answers calls from a queue of scripted responses, in order
/// - falls back to a fixed response once the queue is empty
/// - records every call (with the Tokio clock, so paused time works)
pub struct ScriptedLaunchApi {
    script: Mutex<VecDeque<LaunchResponse>>,
    fallback: LaunchResponse,
    calls: Arc<Mutex<Vec<LaunchCall>>>,
    hook: Option<CallHook>,
}

impl ScriptedLaunchApi {
    /// Every call succeeds.
    pub fn always_accept() -> Self {
        Self::new(Vec::new(), accepted())
    }

    /// Every call fails with the given response.
    pub fn always(response: LaunchResponse) -> Self {
        Self::new(Vec::new(), response)
    }

    pub fn new(script: Vec<LaunchResponse>, fallback: LaunchResponse) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
            hook: None,
        }
    }

    /// Run `hook(n)` after the n-th call (1-based) has been answered.
    pub fn with_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<LaunchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TaskLaunchApi for ScriptedLaunchApi {
    async fn launch(
        &self,
        cluster: &str,
        task_definition: &str,
    ) -> Result<LaunchReply, ProviderError> {
        let n = {
            let mut guard = self.calls.lock().unwrap();
            guard.push(LaunchCall {
                cluster: cluster.to_string(),
                task_definition: task_definition.to_string(),
                at: Instant::now(),
            });
            guard.len()
        };

        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(hook) = &self.hook {
            hook(n);
        }

        response
    }
}

/// A status API with fixed answers and call counters.
pub struct FakeStatusApi {
    list: Result<Vec<String>, ProviderError>,
    describe: Result<Vec<TaskDescription>, ProviderError>,
    pub list_calls: AtomicUsize,
    pub describe_calls: AtomicUsize,
    pub last_max_results: AtomicUsize,
}

impl FakeStatusApi {
    pub fn new(
        list: Result<Vec<String>, ProviderError>,
        describe: Result<Vec<TaskDescription>, ProviderError>,
    ) -> Self {
        Self {
            list,
            describe,
            list_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
            last_max_results: AtomicUsize::new(0),
        }
    }

    /// Nothing running.
    pub fn empty() -> Self {
        Self::new(Ok(Vec::new()), Ok(Vec::new()))
    }

    /// List and describe agree on the given tasks.
    pub fn with_tasks(tasks: Vec<TaskDescription>) -> Self {
        let arns = tasks.iter().map(|t| t.task_arn.clone()).collect();
        Self::new(Ok(arns), Ok(tasks))
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStatusApi for FakeStatusApi {
    async fn list_running(
        &self,
        _cluster: &str,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.last_max_results
            .store(max_results as usize, Ordering::SeqCst);
        self.list.clone()
    }

    async fn describe(
        &self,
        _cluster: &str,
        _task_ids: &[String],
    ) -> Result<Vec<TaskDescription>, ProviderError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.describe.clone()
    }
}
