//! Inbound content to relay

use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, UserId};

/// Media types the relay forwards by file id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
    Document,
    Sticker,
}

impl MediaKind {
    /// Stickers cannot carry a caption
    pub fn supports_caption(&self) -> bool {
        !matches!(self, Self::Sticker)
    }
}

/// The message a text payload answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    /// Replied message id in the sender's own chat
    pub message_id: MessageId,
    pub text: String,
    /// Platform author of the replied message when it is a user
    pub author_id: Option<UserId>,
    /// Platform-provided first name, last resort for the quote header
    pub author_fallback_name: String,
}

/// Content of one inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Text {
        text: String,
        reply: Option<ReplyContext>,
    },
    Media {
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            reply: None,
        }
    }

    /// Text stored in the audit log
    pub fn audit_text(&self) -> String {
        match self {
            Self::Text { text, .. } => text.clone(),
            Self::Media { kind, caption, .. } => match caption {
                Some(caption) => format!("[{kind:?}] {caption}"),
                None => format!("[{kind:?}]"),
            },
        }
    }
}
