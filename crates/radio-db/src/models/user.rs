//! User database model

use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Database model for the `user` table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub user_id: i64,
    pub channel: i64,
    pub name: String,
    pub custom_name: Option<String>,
    pub emoji: Option<String>,
    /// Naive UTC; older rows may lack it
    pub created_at: Option<NaiveDateTime>,
}
