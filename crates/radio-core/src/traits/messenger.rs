//! Messenger port - outbound operations against the chat platform
//!
//! Every operation takes a request struct with explicit required and optional
//! fields. Failures come back as [`DeliveryError`] so callers can tell an
//! unreachable recipient from a transient fault.

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::MediaKind;
use crate::value_objects::{ChatId, MessageId};

/// How the text body should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

/// Origin shown on the button under a relayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    /// A listener's display name
    Name,
    /// Bot announcements
    System,
    /// Owner mass mailings
    Owner,
}

impl BadgeKind {
    /// Callback payload carried by the button
    pub fn callback_data(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::System => "system",
            Self::Owner => "owner",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "name" => Some(Self::Name),
            "system" => Some(Self::System),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }
}

/// Single inline button attached to outbound messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub kind: BadgeKind,
}

impl Badge {
    pub fn name(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: BadgeKind::Name,
        }
    }

    pub fn system(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: BadgeKind::System,
        }
    }

    pub fn owner(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: BadgeKind::Owner,
        }
    }
}

/// Send a text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendText {
    pub chat: ChatId,
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<MessageId>,
    pub badge: Option<Badge>,
}

impl SendText {
    pub fn plain(chat: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat: chat.into(),
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
            badge: None,
        }
    }

    pub fn html(chat: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::plain(chat, text)
        }
    }

    pub fn reply_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }

    pub fn badge(mut self, badge: Badge) -> Self {
        self.badge = Some(badge);
        self
    }
}

/// Re-send media by platform file id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMedia {
    pub chat: ChatId,
    pub kind: MediaKind,
    pub file_id: String,
    pub caption: Option<String>,
    pub badge: Option<Badge>,
}

/// Replace the text of a message the bot sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditText {
    pub chat: ChatId,
    pub message: MessageId,
    pub text: String,
    pub format: TextFormat,
}

/// Delete one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteMessage {
    pub chat: ChatId,
    pub message: MessageId,
}

/// Put an emoji reaction on one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetReaction {
    pub chat: ChatId,
    pub message: MessageId,
    pub emoji: String,
}

/// Typed outcome of a failed platform call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("recipient blocked the bot")]
    Blocked,

    #[error("chat not found")]
    NotFound,

    #[error("recipient account deactivated")]
    Deactivated,

    #[error("transport error: {0}")]
    Other(String),
}

impl DeliveryError {
    /// The recipient can never be reached again
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Blocked | Self::NotFound | Self::Deactivated)
    }
}

/// Result type for messenger operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send text, returns the id of the new message
    async fn send_text(&self, request: SendText) -> DeliveryResult<MessageId>;

    /// Send media, returns the id of the new message
    async fn send_media(&self, request: SendMedia) -> DeliveryResult<MessageId>;

    async fn edit_text(&self, request: EditText) -> DeliveryResult<()>;

    async fn delete_message(&self, request: DeleteMessage) -> DeliveryResult<()>;

    async fn set_reaction(&self, request: SetReaction) -> DeliveryResult<()>;
}
