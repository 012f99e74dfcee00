use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub consecutive_failure: u64,
    pub last_outcome: Option<SyncOutcome>,
    pub last_kind: Option<String>,
    pub last_at_ms: Option<i64>,
}

#[derive(Default, Clone)]
struct LastOutcome {
    outcome: Option<SyncOutcome>,
    kind: Option<String>,
    at_ms: Option<i64>,
}

/// Pass-outcome counters recorded by the orchestrator's retry loop.
pub struct SyncMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    consecutive_failure: AtomicU64,
    last: Mutex<LastOutcome>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            last: Mutex::new(LastOutcome::default()),
        }
    }

    pub fn record_success(&self, kind: &str) {
        self.success.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failure.store(0, Ordering::Relaxed);
        self.record_last(SyncOutcome::Success, kind);
    }

    pub fn record_failure(&self, kind: &str) {
        self.failure.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
        self.record_last(SyncOutcome::Failure, kind);
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        let last = self
            .last
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        SyncMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            last_outcome: last.outcome,
            last_kind: last.kind,
            last_at_ms: last.at_ms,
        }
    }

    fn record_last(&self, outcome: SyncOutcome, kind: &str) {
        if let Ok(mut guard) = self.last.lock() {
            guard.outcome = Some(outcome);
            guard.kind = Some(kind.to_string());
            guard.at_ms = Some(Utc::now().timestamp_millis());
        }
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_failures_reset_on_success() {
        let metrics = SyncMetrics::new();
        metrics.record_failure("users");
        metrics.record_failure("users");
        assert_eq!(metrics.snapshot().consecutive_failure, 2);

        metrics.record_success("users");
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.consecutive_failure, 0);
        assert_eq!(snapshot.total_failure, 2);
        assert_eq!(snapshot.total_success, 1);
        assert_eq!(snapshot.last_outcome, Some(SyncOutcome::Success));
        assert_eq!(snapshot.last_kind.as_deref(), Some("users"));
    }
}
