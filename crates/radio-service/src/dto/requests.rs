//! Request DTOs for commands that carry free text
//!
//! Every DTO implements `Validate`; services call `validate()` before any
//! state change.

use radio_core::UserId;
use serde::Deserialize;
use validator::Validate;

/// `/version <n> <text>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VersionAnnouncement {
    #[validate(length(min = 1, max = 32, message = "Version must be 1-32 characters"))]
    pub version: String,

    #[validate(length(min = 1, max = 3500, message = "Notes must be 1-3500 characters"))]
    pub notes: String,
}

/// `/broadcast <text>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1, max = 4096, message = "Message must be 1-4096 characters"))]
    pub text: String,
}

impl BroadcastRequest {
    /// Text as sent: long dashes become plain hyphens
    pub fn normalized_text(&self) -> String {
        self.text.replace('—', "-")
    }
}

/// `/emoji <id> <emoji>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmojiRequest {
    pub target: UserId,

    #[validate(length(min = 1, max = 8, message = "Emoji must be 1-8 characters"))]
    pub emoji: String,
}

/// `/name <text>`; the name policy runs after the length guard
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}
