use sqlx::SqlitePool;

use crate::domain::value_objects::SyncStatus;
use crate::shared::error::AppError;

use super::rows::CachedChatMessage;

/// Access object for the `chat_messages` table.
pub struct ChatMessageCache {
    pool: SqlitePool,
}

impl ChatMessageCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, message_id: &str) -> Result<Option<CachedChatMessage>, AppError> {
        let row = sqlx::query_as::<_, CachedChatMessage>(
            "SELECT * FROM chat_messages WHERE message_id = ?1",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_all(&self) -> Result<Vec<CachedChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, CachedChatMessage>(
            "SELECT * FROM chat_messages ORDER BY timestamp ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_for_chat(&self, chat_id: &str) -> Result<Vec<CachedChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, CachedChatMessage>(
            "SELECT * FROM chat_messages WHERE chat_id = ?1 ORDER BY timestamp ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive containment over content and sender name.
    pub async fn search(&self, query: &str) -> Result<Vec<CachedChatMessage>, AppError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, CachedChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE content LIKE ?1
               OR sender_name LIKE ?1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persists a message composed on this device. The row arrives with
    /// `pending` status from `CachedChatMessage::new_local`.
    pub async fn save_local(&self, message: &CachedChatMessage) -> Result<(), AppError> {
        insert_row(&self.pool, message).await?;
        Ok(())
    }

    pub async fn upsert_one(&self, message: &CachedChatMessage) -> Result<(), AppError> {
        insert_row(&self.pool, message).await?;
        Ok(())
    }

    pub async fn upsert_many(&self, messages: &[CachedChatMessage]) -> Result<(), AppError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for message in messages {
            insert_row(&mut *tx, message).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Flips the read flag without rewriting the record.
    pub async fn mark_read(&self, message_id: &str, read_timestamp: i64) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE chat_messages SET is_read = 1, read_timestamp = ?1 WHERE message_id = ?2",
        )
        .bind(read_timestamp)
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Confirms a locally-created message after the remote write succeeded.
    pub async fn mark_synced(&self, message_id: &str, last_sync: i64) -> Result<(), AppError> {
        self.update_sync_status(message_id, SyncStatus::Synced, last_sync)
            .await
    }

    pub async fn update_sync_status(
        &self,
        message_id: &str,
        status: SyncStatus,
        last_sync: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE chat_messages SET sync_status = ?1, last_sync = ?2 WHERE message_id = ?3",
        )
        .bind(status.as_str())
        .bind(last_sync)
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn pending_messages(&self) -> Result<Vec<CachedChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, CachedChatMessage>(
            "SELECT * FROM chat_messages WHERE sync_status = 'pending' ORDER BY timestamp ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_by_id(&self, message_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM chat_messages WHERE message_id = ?1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM chat_messages")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(executor: E, message: &CachedChatMessage) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO chat_messages (
            message_id, chat_id, sender_id, sender_name, content,
            message_type, file_url, file_name, file_size, timestamp,
            is_read, read_timestamp, reply_to_message_id, is_edited,
            edit_timestamp, is_deleted, delete_timestamp, updated_at,
            last_sync, sync_status
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
        )
        "#,
    )
    .bind(&message.message_id)
    .bind(&message.chat_id)
    .bind(&message.sender_id)
    .bind(&message.sender_name)
    .bind(&message.content)
    .bind(&message.message_type)
    .bind(&message.file_url)
    .bind(&message.file_name)
    .bind(message.file_size)
    .bind(message.timestamp)
    .bind(message.is_read)
    .bind(message.read_timestamp)
    .bind(&message.reply_to_message_id)
    .bind(message.is_edited)
    .bind(message.edit_timestamp)
    .bind(message.is_deleted)
    .bind(message.delete_timestamp)
    .bind(message.updated_at)
    .bind(message.last_sync)
    .bind(&message.sync_status)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn sample_message(id: &str, chat_id: &str, timestamp: i64) -> CachedChatMessage {
        CachedChatMessage {
            message_id: id.to_string(),
            chat_id: chat_id.to_string(),
            sender_id: "u1".to_string(),
            sender_name: "Jane A".to_string(),
            content: format!("message {id}"),
            message_type: "text".to_string(),
            file_url: None,
            file_name: None,
            file_size: 0,
            timestamp,
            is_read: false,
            read_timestamp: 0,
            reply_to_message_id: None,
            is_edited: false,
            edit_timestamp: 0,
            is_deleted: false,
            delete_timestamp: 0,
            updated_at: timestamp,
            last_sync: timestamp,
            sync_status: "synced".to_string(),
        }
    }

    #[tokio::test]
    async fn chat_scope_and_timestamp_order() {
        let cache = ChatMessageCache::new(setup_pool().await);
        cache
            .upsert_many(&[
                sample_message("m2", "chat1", 20),
                sample_message("m1", "chat1", 10),
                sample_message("m3", "chat2", 5),
            ])
            .await
            .unwrap();

        let chat1 = cache.get_for_chat("chat1").await.unwrap();
        assert_eq!(chat1.len(), 2);
        assert_eq!(chat1[0].message_id, "m1");
        assert_eq!(chat1[1].message_id, "m2");
    }

    #[tokio::test]
    async fn mark_read_touches_only_read_fields() {
        let cache = ChatMessageCache::new(setup_pool().await);
        cache
            .upsert_one(&sample_message("m1", "chat1", 10))
            .await
            .unwrap();

        cache.mark_read("m1", 42).await.unwrap();
        let stored = cache.get_by_id("m1").await.unwrap().unwrap();
        assert!(stored.is_read);
        assert_eq!(stored.read_timestamp, 42);
        assert_eq!(stored.content, "message m1");
        assert_eq!(stored.sync_status, "synced");
    }

    #[tokio::test]
    async fn local_message_starts_pending_and_can_be_confirmed() {
        let cache = ChatMessageCache::new(setup_pool().await);
        let draft = CachedChatMessage::new_local("chat1", "u1", "Jane A", "hi there");
        cache.save_local(&draft).await.unwrap();

        let pending = cache.pending_messages().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].sync_status, "pending");

        cache.mark_synced(&draft.message_id, 99).await.unwrap();
        assert!(cache.pending_messages().await.unwrap().is_empty());
        let stored = cache.get_by_id(&draft.message_id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, "synced");
        assert_eq!(stored.last_sync, 99);
    }
}
