//! SQLite implementation of DeliveryLogRepository

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use radio_core::{ChatId, DeliveryLogRepository, DeliveryRecord, MessageId, RepoResult};

use crate::mappers::StoredMessageRow;
use crate::models::StoredMessageModel;

use super::error::map_db_error;

/// SQLite implementation of DeliveryLogRepository
#[derive(Clone)]
pub struct SqliteDeliveryLogRepository {
    pool: SqlitePool,
}

impl SqliteDeliveryLogRepository {
    /// Create a new SqliteDeliveryLogRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLogRepository for SqliteDeliveryLogRepository {
    #[instrument(skip(self, record), fields(sender_id = %record.sender_id, copies = record.deliveries.len()))]
    async fn append(&self, record: &DeliveryRecord) -> RepoResult<i64> {
        let row = StoredMessageRow::new(record);

        let result = sqlx::query(
            r"
            INSERT INTO storedmessage
                (sender_id, sender_name, message_data, message, timestamp, origin_message)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(row.sender_id)
        .bind(row.sender_name)
        .bind(&row.message_data)
        .bind(row.message)
        .bind(row.timestamp)
        .bind(row.origin_message)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.last_insert_rowid())
    }

    #[instrument(skip(self))]
    async fn find_by_copy(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> RepoResult<Option<DeliveryRecord>> {
        // Pad both sides so `1:2` cannot match inside `11:23`
        let pattern = format!("% {chat}:{message} %");

        let result = sqlx::query_as::<_, StoredMessageModel>(
            r"
            SELECT id, sender_id, sender_name, message_data, message, timestamp, origin_message
            FROM storedmessage
            WHERE (sender_id = ? AND origin_message = ?)
               OR (' ' || message_data || ' ') LIKE ?
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(chat.into_inner())
        .bind(message.into_inner())
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(DeliveryRecord::from))
    }
}
