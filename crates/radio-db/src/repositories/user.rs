//! SQLite implementation of UserRepository

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use radio_core::{ChannelId, RepoResult, UserId, UserRecord, UserRepository};

use crate::mappers::UserRow;
use crate::models::UserModel;

use super::error::map_db_error;

const SELECT_USER: &str = r#"
    SELECT user_id, channel, name, custom_name, emoji, created_at
    FROM "user"
"#;

/// SQLite implementation of UserRepository
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new SqliteUserRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let result = sqlx::query_as::<_, UserModel>(&format!("{SELECT_USER} WHERE user_id = ?"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(UserRecord::from))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<UserRecord>> {
        let results = sqlx::query_as::<_, UserModel>(&format!("{SELECT_USER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(UserRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_channel(&self, channel: ChannelId) -> RepoResult<Vec<UserRecord>> {
        let results =
            sqlx::query_as::<_, UserModel>(&format!("{SELECT_USER} WHERE channel = ? ORDER BY id"))
                .bind(channel.into_inner())
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(results.into_iter().map(UserRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn channel_populations(&self) -> RepoResult<Vec<(ChannelId, u64)>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT channel, COUNT(*)
            FROM "user"
            GROUP BY channel
            ORDER BY channel
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(channel, members)| (ChannelId::new(channel), members.max(0) as u64))
            .collect())
    }

    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn create_if_absent(&self, user: &UserRecord) -> RepoResult<bool> {
        let row = UserRow::new(user);

        let result = sqlx::query(
            r#"
            INSERT INTO "user" (user_id, channel, name, custom_name, emoji, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(row.user_id)
        .bind(row.channel)
        .bind(row.name)
        .bind(row.custom_name)
        .bind(row.emoji)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn update(&self, user: &UserRecord) -> RepoResult<()> {
        let row = UserRow::new(user);

        sqlx::query(
            r#"
            UPDATE "user"
            SET channel = ?, name = ?, custom_name = ?, emoji = ?
            WHERE user_id = ?
            "#,
        )
        .bind(row.channel)
        .bind(row.name)
        .bind(row.custom_name)
        .bind(row.emoji)
        .bind(row.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> RepoResult<bool> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE user_id = ?"#)
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
