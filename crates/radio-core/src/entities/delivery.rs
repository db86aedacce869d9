//! Delivery record - audit entry for one fan-out

use serde::{Deserialize, Serialize};

use crate::value_objects::{ChatId, MessageId, UserId};

/// One delivered copy of a relayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delivery {
    pub chat: ChatId,
    pub message: MessageId,
}

impl Delivery {
    pub fn new(chat: impl Into<ChatId>, message: MessageId) -> Self {
        Self {
            chat: chat.into(),
            message,
        }
    }
}

/// Append-only audit entry written after every fan-out that delivered at
/// least one copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub sender_id: UserId,
    pub sender_display_name: String,
    /// The sender's own message the copies were made from
    pub origin_message: MessageId,
    pub deliveries: Vec<Delivery>,
    pub message_text: String,
    /// Epoch seconds
    pub timestamp: i64,
}

impl DeliveryRecord {
    /// Whether `(chat, message)` is the origin or one of the copies
    pub fn contains(&self, chat: ChatId, message: MessageId) -> bool {
        (ChatId::from(self.sender_id) == chat && self.origin_message == message)
            || self
                .deliveries
                .iter()
                .any(|d| d.chat == chat && d.message == message)
    }

    /// Every copy plus the origin
    pub fn all_copies(&self) -> Vec<Delivery> {
        let mut copies = Vec::with_capacity(self.deliveries.len() + 1);
        copies.push(Delivery::new(self.sender_id, self.origin_message));
        copies.extend(self.deliveries.iter().copied());
        copies
    }
}

/// Serialize a mapping as space-joined `chat:message` pairs
pub fn encode_deliveries(deliveries: &[Delivery]) -> String {
    deliveries
        .iter()
        .map(|d| format!("{}:{}", d.chat, d.message))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse space-joined `chat:message` pairs, skipping malformed ones
pub fn decode_deliveries(data: &str) -> Vec<Delivery> {
    data.split_whitespace()
        .filter_map(|pair| {
            let (chat, message) = pair.split_once(':')?;
            Some(Delivery {
                chat: chat.parse().ok()?,
                message: message.parse().ok()?,
            })
        })
        .collect()
}
