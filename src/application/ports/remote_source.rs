use crate::domain::entities::ChatThread;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// A raw document from the remote store: the server-assigned id plus the
/// document payload. Modification times live inside `data`.
#[derive(Debug, Clone)]
pub struct RemoteDocument {
    pub id: String,
    pub data: Value,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// The hosted document database, reduced to the queries the sync layer
/// issues. Implementations wrap the backend SDK and are injected at the
/// composition root.
#[async_trait]
pub trait RemoteDocumentSource: Send + Sync {
    /// Documents of `collection` modified strictly after `since`
    /// (epoch milliseconds), optionally restricted to active documents,
    /// ordered ascending by modification time.
    async fn fetch_updated_since(
        &self,
        collection: &str,
        since: i64,
        active_only: bool,
    ) -> Result<Vec<RemoteDocument>, AppError>;

    /// Chat threads whose participant list contains `user_id`.
    async fn chat_threads_for(&self, user_id: &str) -> Result<Vec<ChatThread>, AppError>;

    /// Messages of one thread with a timestamp strictly after `since`,
    /// ordered ascending by timestamp.
    async fn fetch_chat_messages_since(
        &self,
        chat_id: &str,
        since: i64,
    ) -> Result<Vec<RemoteDocument>, AppError>;
}
