use std::sync::Mutex;

use crate::ports::Notifier;

/// Writes the notice to the log at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_failure(&self, message: &str) {
        tracing::warn!(notice = message, "user-visible failure");
    }
}

/// Collects notices so callers can inspect or replay them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().map(|n| n.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn notify_failure(&self, message: &str) {
        tracing::warn!(notice = message, "user-visible failure");
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(message.to_string());
        }
    }
}
