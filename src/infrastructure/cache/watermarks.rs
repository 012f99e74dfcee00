use sqlx::SqlitePool;

use crate::shared::error::AppError;

/// Per-entity last-sync epochs gating incremental fetches. Stored in the
/// `sync_watermarks` table; chat threads use one key per thread.
pub struct WatermarkStore {
    pool: SqlitePool,
}

impl WatermarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns 0 for a name that has never synced.
    pub async fn get(&self, entity_name: &str) -> Result<i64, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT last_sync_epoch FROM sync_watermarks WHERE entity_name = ?1")
                .bind(entity_name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(epoch,)| epoch).unwrap_or(0))
    }

    /// Raises the stored epoch to `epoch` if it is higher; never regresses.
    pub async fn advance(&self, entity_name: &str, epoch: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sync_watermarks (entity_name, last_sync_epoch)
            VALUES (?1, ?2)
            ON CONFLICT(entity_name) DO UPDATE SET
                last_sync_epoch = MAX(last_sync_epoch, excluded.last_sync_epoch)
            "#,
        )
        .bind(entity_name)
        .bind(epoch)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Forgets every watermark, forcing the next pass of each entity to
    /// fetch from the beginning. Used together with a cache clear.
    pub async fn reset_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sync_watermarks")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> WatermarkStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        WatermarkStore::new(pool)
    }

    #[tokio::test]
    async fn unknown_name_reads_as_zero() {
        let store = setup_store().await;
        assert_eq!(store.get("users").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn advance_is_monotonic() {
        let store = setup_store().await;
        store.advance("users", 100).await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), 100);

        // A stale writer cannot move the watermark backwards.
        store.advance("users", 50).await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), 100);

        store.advance("users", 150).await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), 150);
    }

    #[tokio::test]
    async fn reset_clears_every_name() {
        let store = setup_store().await;
        store.advance("users", 100).await.unwrap();
        store.advance("chat_messages_c1", 70).await.unwrap();

        store.reset_all().await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), 0);
        assert_eq!(store.get("chat_messages_c1").await.unwrap(), 0);
    }
}
