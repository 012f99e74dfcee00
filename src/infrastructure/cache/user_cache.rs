use sqlx::SqlitePool;

use crate::domain::value_objects::SyncStatus;
use crate::shared::error::AppError;

use super::rows::CachedUser;

/// Access object for the `users` table.
pub struct UserCache {
    pool: SqlitePool,
}

impl UserCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<CachedUser>, AppError> {
        let row = sqlx::query_as::<_, CachedUser>("SELECT * FROM users WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_all(&self) -> Result<Vec<CachedUser>, AppError> {
        let rows = sqlx::query_as::<_, CachedUser>("SELECT * FROM users ORDER BY full_name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_mentors(&self) -> Result<Vec<CachedUser>, AppError> {
        let rows = sqlx::query_as::<_, CachedUser>(
            "SELECT * FROM users WHERE is_mentor = 1 ORDER BY full_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive containment over name, job title, company and
    /// skills.
    pub async fn search(&self, query: &str) -> Result<Vec<CachedUser>, AppError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, CachedUser>(
            r#"
            SELECT * FROM users
            WHERE full_name LIKE ?1
               OR current_job_title LIKE ?1
               OR current_company LIKE ?1
               OR skills LIKE ?1
            ORDER BY full_name ASC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_one(&self, user: &CachedUser) -> Result<(), AppError> {
        insert_row(&self.pool, user).await?;
        Ok(())
    }

    /// Replaces every given row by id inside one transaction.
    pub async fn upsert_many(&self, users: &[CachedUser]) -> Result<(), AppError> {
        if users.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for user in users {
            insert_row(&mut *tx, user).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn update_sync_status(
        &self,
        user_id: &str,
        status: SyncStatus,
        last_sync: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET sync_status = ?1, last_sync = ?2 WHERE user_id = ?3")
            .bind(status.as_str())
            .bind(last_sync)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_by_id(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(executor: E, user: &CachedUser) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO users (
            user_id, email, full_name, profile_image_url, bio,
            graduation_year, major, current_job_title, current_company,
            location, skills, linkedin_url, github_url, website_url,
            is_mentor, mentor_expertise, is_online, last_seen,
            privacy_profile_visible, privacy_contact_visible,
            created_at, updated_at, last_sync, sync_status
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
        )
        "#,
    )
    .bind(&user.user_id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.profile_image_url)
    .bind(&user.bio)
    .bind(&user.graduation_year)
    .bind(&user.major)
    .bind(&user.current_job_title)
    .bind(&user.current_company)
    .bind(&user.location)
    .bind(&user.skills)
    .bind(&user.linkedin_url)
    .bind(&user.github_url)
    .bind(&user.website_url)
    .bind(user.is_mentor)
    .bind(&user.mentor_expertise)
    .bind(user.is_online)
    .bind(user.last_seen)
    .bind(user.privacy_profile_visible)
    .bind(user.privacy_contact_visible)
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.last_sync)
    .bind(&user.sync_status)
    .execute(executor)
    .await?;
    Ok(())
}
