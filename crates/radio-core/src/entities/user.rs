//! User entity - one listener of the relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChannelId, UserId};

/// Directory record for a platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub channel: ChannelId,
    /// Generated pseudonym, replaced on every channel move
    pub base_name: String,
    pub custom_name: Option<String>,
    pub emoji: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new record with a generated name
    pub fn new(user_id: UserId, channel: ChannelId, base_name: String) -> Self {
        Self {
            user_id,
            channel,
            base_name,
            custom_name: None,
            emoji: None,
            created_at: Utc::now(),
        }
    }

    /// Name without the emoji prefix
    pub fn name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.base_name)
    }

    /// Name shown to other listeners
    pub fn display_name(&self) -> String {
        match &self.emoji {
            Some(emoji) => format!("{emoji} {}", self.name()),
            None => self.name().to_string(),
        }
    }

    #[inline]
    pub fn has_custom_name(&self) -> bool {
        self.custom_name.is_some()
    }

    /// Move to another channel. The generated name is replaced unless the
    /// user picked their own.
    pub fn move_to(&mut self, channel: ChannelId, fresh_name: String) {
        if !self.has_custom_name() {
            self.base_name = fresh_name;
        }
        self.channel = channel;
    }
}
