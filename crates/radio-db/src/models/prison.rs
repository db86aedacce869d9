//! Prison database model

use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Database model for the `prisonuser` table
#[derive(Debug, Clone, FromRow)]
pub struct PrisonModel {
    pub user_id: i64,
    pub reason: String,
    pub until: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}
