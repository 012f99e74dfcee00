use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;

use crate::application::ports::{IdentityProvider, RemoteDocument, RemoteDocumentSource};
use crate::domain::value_objects::EntityKind;
use crate::infrastructure::cache::{
    mappers, CachedChatMessage, CachedEvent, CachedJobPosting, CachedUser, ChatMessageCache,
    EventCache, JobPostingCache, UserCache, WatermarkStore,
};
use crate::shared::error::AppError;

const COLLECTION_USERS: &str = "users";
const COLLECTION_JOB_POSTINGS: &str = "job_postings";
const COLLECTION_EVENTS: &str = "alumni_events";

const CHAT_WATERMARK_PREFIX: &str = "chat_messages_";

/// Outcome of one reconciliation pass. `skipped` counts records dropped for
/// deserialization failures; those never fail the pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub kind: EntityKind,
    pub fetched: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub watermark: i64,
}

impl PassSummary {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            fetched: 0,
            upserted: 0,
            skipped: 0,
            watermark: 0,
        }
    }

    fn absorb(&mut self, other: PassSummary) {
        self.fetched += other.fetched;
        self.upserted += other.upserted;
        self.skipped += other.skipped;
        self.watermark = self.watermark.max(other.watermark);
    }
}

/// Storage side of a pass: the access object the converted batch lands in.
#[async_trait]
pub trait RowSink<Row: Send + 'static>: Send + Sync {
    async fn upsert_batch(&self, rows: Vec<Row>) -> Result<(), AppError>;
}

#[async_trait]
impl RowSink<CachedUser> for UserCache {
    async fn upsert_batch(&self, rows: Vec<CachedUser>) -> Result<(), AppError> {
        self.upsert_many(&rows).await
    }
}

#[async_trait]
impl RowSink<CachedJobPosting> for JobPostingCache {
    async fn upsert_batch(&self, rows: Vec<CachedJobPosting>) -> Result<(), AppError> {
        self.upsert_many(&rows).await
    }
}

#[async_trait]
impl RowSink<CachedEvent> for EventCache {
    async fn upsert_batch(&self, rows: Vec<CachedEvent>) -> Result<(), AppError> {
        self.upsert_many(&rows).await
    }
}

#[async_trait]
impl RowSink<CachedChatMessage> for ChatMessageCache {
    async fn upsert_batch(&self, rows: Vec<CachedChatMessage>) -> Result<(), AppError> {
        self.upsert_many(&rows).await
    }
}

/// Runs reconciliation passes against the remote document source. One
/// generic pass serves every collection; only the (fetch, convert, sink)
/// triple differs per entity kind.
pub struct SyncExecutor {
    remote: Arc<dyn RemoteDocumentSource>,
    identity: Arc<dyn IdentityProvider>,
    users: Arc<UserCache>,
    job_postings: Arc<JobPostingCache>,
    events: Arc<EventCache>,
    chat_messages: Arc<ChatMessageCache>,
    watermarks: Arc<WatermarkStore>,
    chat_join_timeout: Duration,
}

impl SyncExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        remote: Arc<dyn RemoteDocumentSource>,
        identity: Arc<dyn IdentityProvider>,
        users: Arc<UserCache>,
        job_postings: Arc<JobPostingCache>,
        events: Arc<EventCache>,
        chat_messages: Arc<ChatMessageCache>,
        watermarks: Arc<WatermarkStore>,
        chat_join_timeout: Duration,
    ) -> Self {
        Self {
            remote,
            identity,
            users,
            job_postings,
            events,
            chat_messages,
            watermarks,
            chat_join_timeout,
        }
    }

    pub async fn run(&self, kind: EntityKind) -> Result<PassSummary, AppError> {
        match kind {
            EntityKind::Users => self.sync_users().await,
            EntityKind::JobPostings => self.sync_job_postings().await,
            EntityKind::Events => self.sync_events().await,
            EntityKind::ChatMessages => self.sync_chat_messages().await,
            EntityKind::All => {
                let mut summary = PassSummary::new(EntityKind::All);
                summary.absorb(self.sync_users().await?);
                summary.absorb(self.sync_job_postings().await?);
                summary.absorb(self.sync_events().await?);
                summary.absorb(self.sync_chat_messages().await?);
                Ok(summary)
            }
        }
    }

    async fn sync_users(&self) -> Result<PassSummary, AppError> {
        self.run_collection_pass(
            EntityKind::Users,
            EntityKind::Users.as_str(),
            |since| self.remote.fetch_updated_since(COLLECTION_USERS, since, false),
            mappers::user_row,
            self.users.as_ref(),
        )
        .await
    }

    async fn sync_job_postings(&self) -> Result<PassSummary, AppError> {
        self.run_collection_pass(
            EntityKind::JobPostings,
            EntityKind::JobPostings.as_str(),
            |since| {
                self.remote
                    .fetch_updated_since(COLLECTION_JOB_POSTINGS, since, true)
            },
            mappers::job_posting_row,
            self.job_postings.as_ref(),
        )
        .await
    }

    async fn sync_events(&self) -> Result<PassSummary, AppError> {
        self.run_collection_pass(
            EntityKind::Events,
            EntityKind::Events.as_str(),
            |since| {
                self.remote
                    .fetch_updated_since(COLLECTION_EVENTS, since, true)
            },
            mappers::event_row,
            self.events.as_ref(),
        )
        .await
    }

    /// Two-level pass: enumerate the current user's threads, then run one
    /// per-thread pass for each, concurrently, under an overall timeout.
    /// Every thread must succeed for the pass to succeed; a failed thread
    /// does not roll back the others' committed batches.
    async fn sync_chat_messages(&self) -> Result<PassSummary, AppError> {
        let user_id = self
            .identity
            .current_user_id()
            .await
            .ok_or_else(|| AppError::Auth("no authenticated user for chat sync".to_string()))?;

        let threads = self.remote.chat_threads_for(&user_id).await?;
        let mut summary = PassSummary::new(EntityKind::ChatMessages);
        if threads.is_empty() {
            return Ok(summary);
        }

        let passes = threads
            .iter()
            .map(|thread| self.sync_messages_for_chat(thread.chat_id.clone()));
        let results = tokio::time::timeout(self.chat_join_timeout, join_all(passes))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "chat sync did not finish within {}s",
                    self.chat_join_timeout.as_secs()
                ))
            })?;

        let mut first_error = None;
        for result in results {
            match result {
                Ok(thread_summary) => summary.absorb(thread_summary),
                Err(err) => {
                    tracing::error!(
                        target: "sync::executor",
                        error = %err,
                        "chat thread sync failed"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(summary)
    }

    async fn sync_messages_for_chat(&self, chat_id: String) -> Result<PassSummary, AppError> {
        let watermark_key = format!("{CHAT_WATERMARK_PREFIX}{chat_id}");
        self.run_collection_pass(
            EntityKind::ChatMessages,
            &watermark_key,
            |since| self.remote.fetch_chat_messages_since(&chat_id, since),
            |doc, last_sync| mappers::message_row(&chat_id, doc, last_sync),
            self.chat_messages.as_ref(),
        )
        .await
    }

    /// One incremental reconciliation pass over a single collection:
    /// fetch strictly-newer documents, convert record by record (skipping
    /// undeserializable ones), commit the batch atomically and advance the
    /// watermark to the pass start time.
    async fn run_collection_pass<Row, Fetch, Fut, Convert>(
        &self,
        kind: EntityKind,
        watermark_key: &str,
        fetch: Fetch,
        convert: Convert,
        sink: &dyn RowSink<Row>,
    ) -> Result<PassSummary, AppError>
    where
        Row: Send + 'static,
        Fetch: FnOnce(i64) -> Fut + Send,
        Fut: Future<Output = Result<Vec<RemoteDocument>, AppError>> + Send,
        Convert: Fn(RemoteDocument, i64) -> Result<Row, AppError> + Send + Sync,
    {
        let since = self.watermarks.get(watermark_key).await?;
        let pass_start = Utc::now().timestamp_millis();

        let documents = fetch(since).await?;
        let fetched = documents.len();

        let mut rows = Vec::with_capacity(fetched);
        let mut skipped = 0usize;
        for document in documents {
            let document_id = document.id.clone();
            match convert(document, pass_start) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(
                        target: "sync::executor",
                        kind = %kind,
                        document_id = %document_id,
                        error = %err,
                        "dropping record that failed to deserialize"
                    );
                }
            }
        }

        let upserted = rows.len();
        let watermark = if rows.is_empty() {
            since
        } else {
            sink.upsert_batch(rows).await?;
            self.watermarks.advance(watermark_key, pass_start).await?;
            pass_start
        };

        tracing::debug!(
            target: "sync::executor",
            kind = %kind,
            key = watermark_key,
            since,
            fetched,
            upserted,
            skipped,
            "reconciliation pass finished"
        );

        Ok(PassSummary {
            kind,
            fetched,
            upserted,
            skipped,
            watermark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ChatThread;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::collections::{HashMap, HashSet};
    use tokio::sync::Mutex;

    struct MockIdentity {
        user_id: Option<String>,
    }

    #[async_trait]
    impl IdentityProvider for MockIdentity {
        async fn current_user_id(&self) -> Option<String> {
            self.user_id.clone()
        }
    }

    #[derive(Default)]
    struct MockRemote {
        collections: Mutex<HashMap<String, Vec<RemoteDocument>>>,
        threads: Vec<ChatThread>,
        failing_collections: HashSet<String>,
        failing_chats: HashSet<String>,
        slow_chats: HashMap<String, Duration>,
    }

    impl MockRemote {
        async fn put_docs(&self, collection: &str, docs: Vec<RemoteDocument>) {
            self.collections
                .lock()
                .await
                .insert(collection.to_string(), docs);
        }

        fn modified_at(doc: &RemoteDocument) -> i64 {
            doc.data
                .get("updatedAt")
                .or_else(|| doc.data.get("timestamp"))
                .and_then(|value| value.as_i64())
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl RemoteDocumentSource for MockRemote {
        async fn fetch_updated_since(
            &self,
            collection: &str,
            since: i64,
            _active_only: bool,
        ) -> Result<Vec<RemoteDocument>, AppError> {
            if self.failing_collections.contains(collection) {
                return Err(AppError::Remote(format!("{collection} unavailable")));
            }
            let collections = self.collections.lock().await;
            let docs = collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| Self::modified_at(doc) > since)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok(docs)
        }

        async fn chat_threads_for(&self, _user_id: &str) -> Result<Vec<ChatThread>, AppError> {
            Ok(self.threads.clone())
        }

        async fn fetch_chat_messages_since(
            &self,
            chat_id: &str,
            since: i64,
        ) -> Result<Vec<RemoteDocument>, AppError> {
            if let Some(delay) = self.slow_chats.get(chat_id) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing_chats.contains(chat_id) {
                return Err(AppError::Remote(format!("chat {chat_id} unavailable")));
            }
            self.fetch_updated_since(&format!("messages_{chat_id}"), since, false)
                .await
        }
    }

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn build_executor(
        pool: &SqlitePool,
        remote: Arc<MockRemote>,
        user_id: Option<&str>,
        chat_join_timeout: Duration,
    ) -> SyncExecutor {
        SyncExecutor::new(
            remote,
            Arc::new(MockIdentity {
                user_id: user_id.map(String::from),
            }),
            Arc::new(UserCache::new(pool.clone())),
            Arc::new(JobPostingCache::new(pool.clone())),
            Arc::new(EventCache::new(pool.clone())),
            Arc::new(ChatMessageCache::new(pool.clone())),
            Arc::new(WatermarkStore::new(pool.clone())),
            chat_join_timeout,
        )
    }

    fn user_doc(id: &str, name: &str, updated_at: i64) -> RemoteDocument {
        RemoteDocument::new(id, json!({"fullName": name, "updatedAt": updated_at}))
    }

    fn message_doc(id: &str, content: &str, timestamp: i64) -> RemoteDocument {
        RemoteDocument::new(
            id,
            json!({"senderId": "u1", "content": content, "timestamp": timestamp}),
        )
    }

    #[tokio::test]
    async fn user_pass_commits_rows_and_advances_to_pass_start() {
        let pool = setup_pool().await;
        let remote = Arc::new(MockRemote::default());
        remote
            .put_docs(
                COLLECTION_USERS,
                vec![
                    user_doc("u1", "Jane A", 1),
                    user_doc("u2", "Bob K", 2),
                    user_doc("u3", "Eve N", 5),
                ],
            )
            .await;
        let executor = build_executor(&pool, remote, Some("me"), Duration::from_secs(60));

        let before = Utc::now().timestamp_millis();
        let summary = executor.run(EntityKind::Users).await.unwrap();
        let after = Utc::now().timestamp_millis();

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.upserted, 3);
        assert_eq!(summary.skipped, 0);
        // The watermark is the pass start time, not the newest document.
        assert!(summary.watermark >= before && summary.watermark <= after);

        let users = UserCache::new(pool.clone());
        let all = users.get_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|user| user.sync_status == "synced"));

        let stored = WatermarkStore::new(pool.clone())
            .get("users")
            .await
            .unwrap();
        assert_eq!(stored, summary.watermark);
    }

    #[tokio::test]
    async fn repeated_pass_with_no_new_data_changes_nothing() {
        let pool = setup_pool().await;
        let remote = Arc::new(MockRemote::default());
        remote
            .put_docs(COLLECTION_USERS, vec![user_doc("u1", "Jane A", 1)])
            .await;
        let executor = build_executor(&pool, remote, Some("me"), Duration::from_secs(60));

        let first = executor.run(EntityKind::Users).await.unwrap();
        let second = executor.run(EntityKind::Users).await.unwrap();

        assert_eq!(second.fetched, 0);
        assert_eq!(second.upserted, 0);
        // No regression of the watermark.
        assert_eq!(second.watermark, first.watermark);

        let users = UserCache::new(pool.clone());
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn undeserializable_record_is_skipped_without_failing_the_pass() {
        let pool = setup_pool().await;
        let remote = Arc::new(MockRemote::default());
        remote
            .put_docs(
                COLLECTION_USERS,
                vec![
                    user_doc("u1", "Jane A", 1),
                    RemoteDocument::new("broken", json!({"updatedAt": 2, "isMentor": "yes"})),
                    user_doc("u3", "Eve N", 3),
                ],
            )
            .await;
        let executor = build_executor(&pool, remote, Some("me"), Duration::from_secs(60));

        let summary = executor.run(EntityKind::Users).await.unwrap();
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.upserted, 2);
        assert_eq!(summary.skipped, 1);

        let users = UserCache::new(pool.clone());
        assert_eq!(users.count().await.unwrap(), 2);
        assert!(users.get_by_id("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_remote_query_fails_the_pass_and_keeps_the_watermark() {
        let pool = setup_pool().await;
        let mut remote = MockRemote::default();
        remote
            .failing_collections
            .insert(COLLECTION_JOB_POSTINGS.to_string());
        let executor =
            build_executor(&pool, Arc::new(remote), Some("me"), Duration::from_secs(60));

        let err = executor.run(EntityKind::JobPostings).await.unwrap_err();
        assert!(matches!(err, AppError::Remote(_)));

        let stored = WatermarkStore::new(pool.clone())
            .get("job_postings")
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn chat_pass_keeps_healthy_threads_but_reports_failure() {
        let pool = setup_pool().await;
        let mut remote = MockRemote::default();
        remote.threads = vec![
            ChatThread::new("c1", vec!["me".into(), "u2".into()]),
            ChatThread::new("c2", vec!["me".into(), "u3".into()]),
        ];
        remote.failing_chats.insert("c2".to_string());
        let remote = Arc::new(remote);
        remote
            .put_docs("messages_c1", vec![message_doc("m1", "hello", 10)])
            .await;
        let executor = build_executor(&pool, remote, Some("me"), Duration::from_secs(60));

        let err = executor.run(EntityKind::ChatMessages).await.unwrap_err();
        assert!(matches!(err, AppError::Remote(_)));

        // The healthy thread's batch stays committed.
        let messages = ChatMessageCache::new(pool.clone());
        let committed = messages.get_for_chat("c1").await.unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].chat_id, "c1");
    }

    #[tokio::test]
    async fn chat_pass_times_out_when_a_thread_hangs() {
        let pool = setup_pool().await;
        let mut remote = MockRemote::default();
        remote.threads = vec![ChatThread::new("c1", vec!["me".into()])];
        remote
            .slow_chats
            .insert("c1".to_string(), Duration::from_secs(5));
        let executor = build_executor(
            &pool,
            Arc::new(remote),
            Some("me"),
            Duration::from_millis(50),
        );

        let err = executor.run(EntityKind::ChatMessages).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn chat_pass_requires_an_authenticated_user() {
        let pool = setup_pool().await;
        let executor = build_executor(
            &pool,
            Arc::new(MockRemote::default()),
            None,
            Duration::from_secs(60),
        );

        let err = executor.run(EntityKind::ChatMessages).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn per_thread_watermarks_are_independent() {
        let pool = setup_pool().await;
        let mut remote = MockRemote::default();
        remote.threads = vec![
            ChatThread::new("c1", vec!["me".into()]),
            ChatThread::new("c2", vec!["me".into()]),
        ];
        let remote = Arc::new(remote);
        remote
            .put_docs("messages_c1", vec![message_doc("m1", "hi", 10)])
            .await;
        remote.put_docs("messages_c2", vec![]).await;
        let executor = build_executor(&pool, remote, Some("me"), Duration::from_secs(60));

        executor.run(EntityKind::ChatMessages).await.unwrap();

        let watermarks = WatermarkStore::new(pool.clone());
        assert!(watermarks.get("chat_messages_c1").await.unwrap() > 0);
        // The empty thread never advanced.
        assert_eq!(watermarks.get("chat_messages_c2").await.unwrap(), 0);
    }
}
