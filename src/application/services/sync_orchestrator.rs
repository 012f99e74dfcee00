use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::ports::{ConnectivityProbe, IdentityProvider};
use crate::application::services::sync_executor::SyncExecutor;
use crate::domain::value_objects::EntityKind;
use crate::shared::config::SyncConfig;
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};

const PERIODIC_SYNC_JOB: &str = "periodic_sync";
const IMMEDIATE_SYNC_JOB: &str = "immediate_sync";
const FORCE_SYNC_PREFIX: &str = "force_sync_";

const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
enum BackoffPolicy {
    Linear { base: Duration },
    Exponential { base: Duration },
}

impl BackoffPolicy {
    fn linear(base_secs: u64) -> Self {
        BackoffPolicy::Linear {
            base: Duration::from_secs(base_secs),
        }
    }

    fn exponential(base_secs: u64) -> Self {
        BackoffPolicy::Exponential {
            base: Duration::from_secs(base_secs),
        }
    }

    /// Delay before retry `attempt` (1-based), clamped to `MAX_BACKOFF`.
    fn delay(&self, attempt: u32) -> Duration {
        let raw = match self {
            BackoffPolicy::Linear { base } => *base * attempt,
            BackoffPolicy::Exponential { base } => *base * 2u32.saturating_pow(attempt - 1),
        };
        raw.min(MAX_BACKOFF)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusReport {
    pub network_available: bool,
    pub user_authenticated: bool,
    pub active_jobs: Vec<String>,
    pub metrics: SyncMetricsSnapshot,
}

/// Decides when reconciliation passes run and keeps duplicate passes of the
/// same job name from racing each other. Periodic requests keep an existing
/// job; immediate and force requests replace one.
pub struct SyncOrchestrator {
    executor: Arc<SyncExecutor>,
    probe: Arc<dyn ConnectivityProbe>,
    identity: Arc<dyn IdentityProvider>,
    config: SyncConfig,
    metrics: Arc<SyncMetrics>,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl SyncOrchestrator {
    pub fn new(
        executor: Arc<SyncExecutor>,
        probe: Arc<dyn ConnectivityProbe>,
        identity: Arc<dyn IdentityProvider>,
        config: SyncConfig,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            executor,
            probe,
            identity,
            config,
            metrics,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Starts the recurring background schedule. A live periodic job is
    /// kept; the request is dropped.
    pub async fn start_periodic(&self) {
        let mut jobs = self.jobs.lock().await;
        if let Some(existing) = jobs.get(PERIODIC_SYNC_JOB) {
            if !existing.is_finished() {
                tracing::debug!(
                    target: "sync::orchestrator",
                    "periodic sync already scheduled, keeping existing job"
                );
                return;
            }
        }

        let executor = self.executor.clone();
        let probe = self.probe.clone();
        let metrics = self.metrics.clone();
        let config = self.config.clone();
        let handle = tokio::spawn(async move {
            loop {
                let delay = periodic_delay(config.periodic_interval_secs, config.flex_secs);
                tokio::time::sleep(delay).await;

                if !probe.is_network_available().await {
                    tracing::debug!(
                        target: "sync::orchestrator",
                        "network not available, skipping periodic sync"
                    );
                    continue;
                }
                if probe.is_battery_low().await {
                    tracing::debug!(
                        target: "sync::orchestrator",
                        "battery low, skipping periodic sync"
                    );
                    continue;
                }

                run_with_retry(
                    &executor,
                    &metrics,
                    EntityKind::All,
                    BackoffPolicy::exponential(config.periodic_backoff_secs),
                    config.max_retry,
                )
                .await;
            }
        });
        jobs.insert(PERIODIC_SYNC_JOB.to_string(), handle);
        tracing::debug!(target: "sync::orchestrator", "periodic sync started");
    }

    /// One-shot sync of everything, replacing any queued immediate job.
    pub async fn trigger_immediate(&self) {
        if !self.probe.is_network_available().await {
            tracing::warn!(
                target: "sync::orchestrator",
                "network not available, skipping immediate sync"
            );
            return;
        }
        self.enqueue_replacing(IMMEDIATE_SYNC_JOB.to_string(), EntityKind::All)
            .await;
        tracing::debug!(target: "sync::orchestrator", "immediate sync triggered");
    }

    /// Caller-requested pass for one entity kind, replacing any queued
    /// force job of the same kind.
    pub async fn force_sync(&self, kind: EntityKind) {
        if !self.probe.is_network_available().await {
            tracing::warn!(
                target: "sync::orchestrator",
                kind = %kind,
                "network not available, cannot force sync"
            );
            return;
        }
        self.enqueue_replacing(format!("{FORCE_SYNC_PREFIX}{}", kind.as_str()), kind)
            .await;
        tracing::debug!(target: "sync::orchestrator", kind = %kind, "force sync triggered");
    }

    pub async fn on_user_authenticated(&self) {
        self.trigger_immediate().await;
    }

    pub async fn on_connectivity_restored(&self) {
        self.trigger_immediate().await;
    }

    /// Aborts every queued or running sync job.
    pub async fn stop_all(&self) {
        let mut jobs = self.jobs.lock().await;
        for (name, handle) in jobs.drain() {
            handle.abort();
            tracing::debug!(target: "sync::orchestrator", job = %name, "sync job stopped");
        }
    }

    /// Restarts the periodic schedule and fires an immediate pass when the
    /// network is up.
    pub async fn resume(&self) {
        self.start_periodic().await;
        self.trigger_immediate().await;
    }

    /// Waits for the named job to finish, if one is queued.
    pub async fn join(&self, name: &str) {
        let handle = self.jobs.lock().await.remove(name);
        if let Some(handle) = handle {
            // An aborted job surfaces as a cancellation error; both are done.
            let _ = handle.await;
        }
    }

    pub async fn active_jobs(&self) -> Vec<String> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub async fn status(&self) -> SyncStatusReport {
        SyncStatusReport {
            network_available: self.probe.is_network_available().await,
            user_authenticated: self.identity.current_user_id().await.is_some(),
            active_jobs: self.active_jobs().await,
            metrics: self.metrics.snapshot(),
        }
    }

    async fn enqueue_replacing(&self, name: String, kind: EntityKind) {
        let mut jobs = self.jobs.lock().await;
        if let Some(existing) = jobs.remove(&name) {
            if !existing.is_finished() {
                existing.abort();
                tracing::debug!(
                    target: "sync::orchestrator",
                    job = %name,
                    "replaced queued sync job"
                );
            }
        }

        let executor = self.executor.clone();
        let probe = self.probe.clone();
        let metrics = self.metrics.clone();
        let config = self.config.clone();
        let handle = tokio::spawn(async move {
            if !probe.is_network_available().await {
                tracing::debug!(
                    target: "sync::orchestrator",
                    kind = %kind,
                    "network lost before sync job ran, skipping"
                );
                return;
            }
            run_with_retry(
                &executor,
                &metrics,
                kind,
                BackoffPolicy::linear(config.immediate_backoff_secs),
                config.max_retry,
            )
            .await;
        });
        jobs.insert(name, handle);
    }
}

/// Interval plus a uniform random offset within the flex window.
fn periodic_delay(interval_secs: u64, flex_secs: u64) -> Duration {
    let flex = flex_secs.min(interval_secs.saturating_sub(1)) as i64;
    let offset = if flex == 0 {
        0
    } else {
        rand::thread_rng().gen_range(-flex..=flex)
    };
    Duration::from_secs((interval_secs as i64 + offset).max(1) as u64)
}

async fn run_with_retry(
    executor: &SyncExecutor,
    metrics: &SyncMetrics,
    kind: EntityKind,
    policy: BackoffPolicy,
    max_retry: u32,
) {
    let mut attempt = 0u32;
    loop {
        match executor.run(kind).await {
            Ok(summary) => {
                metrics.record_success(kind.as_str());
                tracing::info!(
                    target: "sync::orchestrator",
                    kind = %kind,
                    fetched = summary.fetched,
                    upserted = summary.upserted,
                    skipped = summary.skipped,
                    "sync pass completed"
                );
                return;
            }
            Err(err) => {
                metrics.record_failure(kind.as_str());
                attempt += 1;
                if attempt > max_retry {
                    tracing::warn!(
                        target: "sync::orchestrator",
                        kind = %kind,
                        error = %err,
                        "sync pass failed, retries exhausted"
                    );
                    return;
                }
                let delay = policy.delay(attempt);
                tracing::warn!(
                    target: "sync::orchestrator",
                    kind = %kind,
                    error = %err,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "sync pass failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
