use std::sync::{Arc, Mutex};

use taskfleet::launch::{ProgressEvent, ProgressKind, ProgressReporter};

/// A reporter that records events behind a shared handle and can simulate
/// the consumer disconnecting after a number of events.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
    close_after: Option<usize>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report closed once `n` events have been delivered.
    pub fn closing_after(n: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            close_after: Some(n),
        }
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    pub fn messages_of(&self, kinds: &[ProgressKind]) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| kinds.contains(&e.kind))
            .map(|e| e.message)
            .collect()
    }

    pub fn per_task_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.is_per_task())
            .map(|e| e.message)
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn emit(&mut self, event: ProgressEvent) {
        if self.is_closed() {
            return;
        }
        self.events.lock().unwrap().push(event);
    }

    fn is_closed(&self) -> bool {
        match self.close_after {
            Some(n) => self.events.lock().unwrap().len() >= n,
            None => false,
        }
    }
}
