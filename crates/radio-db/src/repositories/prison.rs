//! SQLite implementation of PrisonRepository

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use radio_core::{PrisonEntry, PrisonRepository, RepoResult, UserId};

use crate::mappers::PrisonRow;
use crate::models::PrisonModel;

use super::error::map_db_error;

/// SQLite implementation of PrisonRepository
#[derive(Clone)]
pub struct SqlitePrisonRepository {
    pool: SqlitePool,
}

impl SqlitePrisonRepository {
    /// Create a new SqlitePrisonRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrisonRepository for SqlitePrisonRepository {
    #[instrument(skip(self))]
    async fn find(&self, user: UserId) -> RepoResult<Option<PrisonEntry>> {
        let result = sqlx::query_as::<_, PrisonModel>(
            r"
            SELECT user_id, reason, until, created_at
            FROM prisonuser
            WHERE user_id = ?
            ",
        )
        .bind(user.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PrisonEntry::from))
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id))]
    async fn upsert(&self, entry: &PrisonEntry) -> RepoResult<()> {
        let row = PrisonRow::new(entry);

        sqlx::query(
            r"
            INSERT INTO prisonuser (user_id, reason, until, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                reason = excluded.reason,
                until = excluded.until,
                created_at = excluded.created_at
            ",
        )
        .bind(row.user_id)
        .bind(row.reason)
        .bind(row.until)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user: UserId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM prisonuser WHERE user_id = ?")
            .bind(user.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<PrisonEntry>> {
        let results = sqlx::query_as::<_, PrisonModel>(
            r"
            SELECT user_id, reason, until, created_at
            FROM prisonuser
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PrisonEntry::from).collect())
    }
}
