use sqlx::SqlitePool;

use crate::domain::value_objects::SyncStatus;
use crate::shared::error::AppError;

use super::rows::CachedJobPosting;

/// Access object for the `job_postings` table.
pub struct JobPostingCache {
    pool: SqlitePool,
}

impl JobPostingCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, job_id: &str) -> Result<Option<CachedJobPosting>, AppError> {
        let row =
            sqlx::query_as::<_, CachedJobPosting>("SELECT * FROM job_postings WHERE job_id = ?1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn get_all(&self) -> Result<Vec<CachedJobPosting>, AppError> {
        let rows = sqlx::query_as::<_, CachedJobPosting>(
            "SELECT * FROM job_postings ORDER BY posted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_type(&self, job_type: &str) -> Result<Vec<CachedJobPosting>, AppError> {
        let rows = sqlx::query_as::<_, CachedJobPosting>(
            "SELECT * FROM job_postings WHERE job_type = ?1 ORDER BY posted_at DESC",
        )
        .bind(job_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive containment over position, company and description.
    pub async fn search(&self, query: &str) -> Result<Vec<CachedJobPosting>, AppError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, CachedJobPosting>(
            r#"
            SELECT * FROM job_postings
            WHERE position LIKE ?1
               OR company LIKE ?1
               OR description LIKE ?1
            ORDER BY posted_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_one(&self, job: &CachedJobPosting) -> Result<(), AppError> {
        insert_row(&self.pool, job).await?;
        Ok(())
    }

    pub async fn upsert_many(&self, jobs: &[CachedJobPosting]) -> Result<(), AppError> {
        if jobs.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for job in jobs {
            insert_row(&mut *tx, job).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn update_sync_status(
        &self,
        job_id: &str,
        status: SyncStatus,
        last_sync: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE job_postings SET sync_status = ?1, last_sync = ?2 WHERE job_id = ?3")
            .bind(status.as_str())
            .bind(last_sync)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drops postings whose application deadline has passed. Postings with
    /// no deadline (0) are kept.
    pub async fn prune_expired(&self, now: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM job_postings WHERE application_deadline > 0 AND application_deadline < ?1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_id(&self, job_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM job_postings WHERE job_id = ?1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM job_postings")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_postings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(executor: E, job: &CachedJobPosting) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO job_postings (
            job_id, company, position, description, requirements, location,
            job_type, experience_level, salary_range, application_deadline,
            application_url, posted_by_user_id, posted_by_name, posted_at,
            is_active, tags, created_at, updated_at, last_sync, sync_status
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
        )
        "#,
    )
    .bind(&job.job_id)
    .bind(&job.company)
    .bind(&job.position)
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(&job.location)
    .bind(&job.job_type)
    .bind(&job.experience_level)
    .bind(&job.salary_range)
    .bind(job.application_deadline)
    .bind(&job.application_url)
    .bind(&job.posted_by_user_id)
    .bind(&job.posted_by_name)
    .bind(job.posted_at)
    .bind(job.is_active)
    .bind(&job.tags)
    .bind(job.created_at)
    .bind(job.updated_at)
    .bind(job.last_sync)
    .bind(&job.sync_status)
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

    fn sample_job(id: &str, deadline: i64) -> CachedJobPosting {
        CachedJobPosting {
            job_id: id.to_string(),
            company: "Acme".to_string(),
            position: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            requirements: "rust,sql".to_string(),
            location: "Kampala".to_string(),
            job_type: "full_time".to_string(),
            experience_level: "mid".to_string(),
            salary_range: "UGX 2,500,000 - 4,000,000".to_string(),
            application_deadline: deadline,
            application_url: None,
            posted_by_user_id: "u1".to_string(),
            posted_by_name: "Jane A".to_string(),
            posted_at: 10,
            is_active: true,
            tags: "engineering".to_string(),
            created_at: 1,
            updated_at: 1,
            last_sync: 1,
            sync_status: "synced".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_many_is_atomic_and_replaces_by_id() {
        let cache = JobPostingCache::new(setup_pool().await);
        cache
            .upsert_many(&[sample_job("j1", 0), sample_job("j2", 0)])
            .await
            .unwrap();
        assert_eq!(cache.count().await.unwrap(), 2);

        let mut updated = sample_job("j1", 0);
        updated.position = "Staff Engineer".to_string();
        cache.upsert_many(&[updated]).await.unwrap();
        assert_eq!(cache.count().await.unwrap(), 2);
        assert_eq!(
            cache.get_by_id("j1").await.unwrap().unwrap().position,
            "Staff Engineer"
        );

        // Empty input is a no-op, not an error.
        cache.upsert_many(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn prune_expired_keeps_undated_and_future_postings() {
        let cache = JobPostingCache::new(setup_pool().await);
        cache
            .upsert_many(&[
                sample_job("past", 50),
                sample_job("future", 500),
                sample_job("undated", 0),
            ])
            .await
            .unwrap();

        let removed = cache.prune_expired(100).await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get_by_id("past").await.unwrap().is_none());
        assert!(cache.get_by_id("future").await.unwrap().is_some());
        assert!(cache.get_by_id("undated").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn filters_by_type_and_orders_by_posted_at() {
        let cache = JobPostingCache::new(setup_pool().await);
        let mut newer = sample_job("j1", 0);
        newer.posted_at = 20;
        let mut older = sample_job("j2", 0);
        older.posted_at = 10;
        let mut internship = sample_job("j3", 0);
        internship.job_type = "internship".to_string();
        cache
            .upsert_many(&[older, newer, internship])
            .await
            .unwrap();

        let full_time = cache.get_by_type("full_time").await.unwrap();
        assert_eq!(full_time.len(), 2);
        assert_eq!(full_time[0].job_id, "j1");

        let all = cache.get_all().await.unwrap();
        assert_eq!(all.first().unwrap().job_id, "j1");
    }
}
