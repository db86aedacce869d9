//! Prison entity <-> model mapper

use chrono::{NaiveDateTime, Utc};
use radio_core::{PrisonEntry, UserId};

use crate::models::PrisonModel;

impl From<PrisonModel> for PrisonEntry {
    fn from(model: PrisonModel) -> Self {
        PrisonEntry {
            user_id: UserId::new(model.user_id),
            reason: model.reason,
            until: model.until,
            created_at: model
                .created_at
                .map_or_else(Utc::now, |naive| naive.and_utc()),
        }
    }
}

/// Values bound when writing a prison row
pub struct PrisonRow<'a> {
    pub user_id: i64,
    pub reason: &'a str,
    pub until: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl<'a> PrisonRow<'a> {
    pub fn new(entry: &'a PrisonEntry) -> Self {
        Self {
            user_id: entry.user_id.into_inner(),
            reason: &entry.reason,
            until: entry.until,
            created_at: entry.created_at.naive_utc(),
        }
    }
}
