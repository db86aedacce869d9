//! User entity <-> model mapper

use chrono::{NaiveDateTime, Utc};
use radio_core::{ChannelId, UserId, UserRecord};

use crate::models::UserModel;

/// Convert UserModel to UserRecord entity
impl From<UserModel> for UserRecord {
    fn from(model: UserModel) -> Self {
        UserRecord {
            user_id: UserId::new(model.user_id),
            channel: ChannelId::new(model.channel),
            base_name: model.name,
            custom_name: model.custom_name,
            emoji: model.emoji,
            created_at: model
                .created_at
                .map_or_else(Utc::now, |naive| naive.and_utc()),
        }
    }
}

/// Values bound when writing a user row
pub struct UserRow<'a> {
    pub user_id: i64,
    pub channel: i64,
    pub name: &'a str,
    pub custom_name: Option<&'a str>,
    pub emoji: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl<'a> UserRow<'a> {
    pub fn new(user: &'a UserRecord) -> Self {
        Self {
            user_id: user.user_id.into_inner(),
            channel: user.channel.into_inner(),
            name: &user.base_name,
            custom_name: user.custom_name.as_deref(),
            emoji: user.emoji.as_deref(),
            created_at: user.created_at.naive_utc(),
        }
    }
}
