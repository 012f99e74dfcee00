use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ConnectivityProbe, IdentityProvider, RemoteDocumentSource};
use crate::application::services::{SyncExecutor, SyncOrchestrator};
use crate::infrastructure::cache::{
    ChatMessageCache, EventCache, JobPostingCache, UserCache, WatermarkStore,
};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use crate::shared::metrics::SyncMetrics;

/// Composition root. One pool, one executor and one orchestrator per
/// process, built here and handed to callers; nothing in the crate reaches
/// for a global.
pub struct SyncRuntime {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub users: Arc<UserCache>,
    pub job_postings: Arc<JobPostingCache>,
    pub events: Arc<EventCache>,
    pub chat_messages: Arc<ChatMessageCache>,
    pub watermarks: Arc<WatermarkStore>,
    pub executor: Arc<SyncExecutor>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub metrics: Arc<SyncMetrics>,
}

impl SyncRuntime {
    pub async fn initialize(
        config: AppConfig,
        remote: Arc<dyn RemoteDocumentSource>,
        probe: Arc<dyn ConnectivityProbe>,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let pool = ConnectionPool::new(&config.database.url, config.database.max_connections)
            .await
            .map_err(AppError::from)?;
        pool.migrate().await.map_err(AppError::from)?;

        let users = Arc::new(UserCache::new(pool.get_pool().clone()));
        let job_postings = Arc::new(JobPostingCache::new(pool.get_pool().clone()));
        let events = Arc::new(EventCache::new(pool.get_pool().clone()));
        let chat_messages = Arc::new(ChatMessageCache::new(pool.get_pool().clone()));
        let watermarks = Arc::new(WatermarkStore::new(pool.get_pool().clone()));

        let executor = Arc::new(SyncExecutor::new(
            remote,
            identity.clone(),
            users.clone(),
            job_postings.clone(),
            events.clone(),
            chat_messages.clone(),
            watermarks.clone(),
            Duration::from_secs(config.sync.chat_join_timeout_secs),
        ));

        let metrics = Arc::new(SyncMetrics::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            executor.clone(),
            probe,
            identity,
            config.sync.clone(),
            metrics.clone(),
        ));

        if config.sync.auto_sync {
            orchestrator.start_periodic().await;
            orchestrator.trigger_immediate().await;
        }

        tracing::info!(target: "sync::runtime", "sync runtime initialized");

        Ok(Self {
            config,
            pool,
            users,
            job_postings,
            events,
            chat_messages,
            watermarks,
            executor,
            orchestrator,
            metrics,
        })
    }

    /// Empties every cache table and forgets the watermarks, so the next
    /// pass re-fetches everything.
    pub async fn clear_offline_data(&self) -> Result<(), AppError> {
        self.users.delete_all().await?;
        self.job_postings.delete_all().await?;
        self.events.delete_all().await?;
        self.chat_messages.delete_all().await?;
        self.watermarks.reset_all().await?;
        tracing::info!(target: "sync::runtime", "offline data cleared");
        Ok(())
    }

    /// Drops cache rows whose deadline passed: expired job postings and
    /// already-ended events.
    pub async fn prune_stale_data(&self, now: i64) -> Result<u64, AppError> {
        let jobs = self.job_postings.prune_expired(now).await?;
        let events = self.events.prune_ended(now).await?;
        Ok(jobs + events)
    }

    pub async fn shutdown(&self) {
        self.orchestrator.stop_all().await;
        self.pool.close().await;
        tracing::info!(target: "sync::runtime", "sync runtime shut down");
    }
}

/// Installs the default tracing subscriber, filtered by `RUST_LOG`. Safe to
/// call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
