//! Delivery log database model

use sqlx::FromRow;

/// Database model for the `storedmessage` table
#[derive(Debug, Clone, FromRow)]
pub struct StoredMessageModel {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    /// Space-joined `chat:message` pairs
    pub message_data: String,
    pub message: String,
    pub timestamp: i64,
    /// Missing on rows written before origins were recorded
    pub origin_message: Option<i32>,
}
