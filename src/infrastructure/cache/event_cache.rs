use sqlx::SqlitePool;

use crate::domain::value_objects::SyncStatus;
use crate::shared::error::AppError;

use super::rows::CachedEvent;

/// Access object for the `events` table.
pub struct EventCache {
    pool: SqlitePool,
}

impl EventCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, event_id: &str) -> Result<Option<CachedEvent>, AppError> {
        let row = sqlx::query_as::<_, CachedEvent>("SELECT * FROM events WHERE event_id = ?1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_all(&self) -> Result<Vec<CachedEvent>, AppError> {
        let rows = sqlx::query_as::<_, CachedEvent>("SELECT * FROM events ORDER BY start_time DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_category(&self, category: &str) -> Result<Vec<CachedEvent>, AppError> {
        let rows = sqlx::query_as::<_, CachedEvent>(
            "SELECT * FROM events WHERE category = ?1 ORDER BY start_time DESC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive containment over title, description and venue.
    pub async fn search(&self, query: &str) -> Result<Vec<CachedEvent>, AppError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, CachedEvent>(
            r#"
            SELECT * FROM events
            WHERE title LIKE ?1
               OR description LIKE ?1
               OR venue LIKE ?1
            ORDER BY start_time DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_one(&self, event: &CachedEvent) -> Result<(), AppError> {
        insert_row(&self.pool, event).await?;
        Ok(())
    }

    pub async fn upsert_many(&self, events: &[CachedEvent]) -> Result<(), AppError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for event in events {
            insert_row(&mut *tx, event).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn update_sync_status(
        &self,
        event_id: &str,
        status: SyncStatus,
        last_sync: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET sync_status = ?1, last_sync = ?2 WHERE event_id = ?3")
            .bind(status.as_str())
            .bind(last_sync)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drops events that already ended. Events with no end time (0) are
    /// kept.
    pub async fn prune_ended(&self, now: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE end_time > 0 AND end_time < ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_id(&self, event_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM events WHERE event_id = ?1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM events")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(executor: E, event: &CachedEvent) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO events (
            event_id, title, description, category, start_time, end_time,
            location, venue, is_virtual, meeting_link, max_attendees,
            current_attendees, registration_deadline, is_paid, price,
            currency, organizer_id, organizer_name, contact_email,
            contact_phone, image_url, tags, is_active, created_at,
            updated_at, last_sync, sync_status
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27
        )
        "#,
    )
    .bind(&event.event_id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(&event.category)
    .bind(event.start_time)
    .bind(event.end_time)
    .bind(&event.location)
    .bind(&event.venue)
    .bind(event.is_virtual)
    .bind(&event.meeting_link)
    .bind(event.max_attendees)
    .bind(event.current_attendees)
    .bind(event.registration_deadline)
    .bind(event.is_paid)
    .bind(event.price)
    .bind(&event.currency)
    .bind(&event.organizer_id)
    .bind(&event.organizer_name)
    .bind(&event.contact_email)
    .bind(&event.contact_phone)
    .bind(&event.image_url)
    .bind(&event.tags)
    .bind(event.is_active)
    .bind(event.created_at)
    .bind(event.updated_at)
    .bind(event.last_sync)
    .bind(&event.sync_status)
    .execute(executor)
    .await?;
    Ok(())
}
