//! Delivery record <-> model mapper

use radio_core::{decode_deliveries, encode_deliveries, DeliveryRecord, MessageId, UserId};

use crate::models::StoredMessageModel;

impl From<StoredMessageModel> for DeliveryRecord {
    fn from(model: StoredMessageModel) -> Self {
        DeliveryRecord {
            sender_id: UserId::new(model.sender_id),
            sender_display_name: model.sender_name,
            // Rows from before origins were recorded point at no message
            origin_message: MessageId::new(model.origin_message.unwrap_or_default()),
            deliveries: decode_deliveries(&model.message_data),
            message_text: model.message,
            timestamp: model.timestamp,
        }
    }
}

/// Values bound when appending to the log
pub struct StoredMessageRow<'a> {
    pub sender_id: i64,
    pub sender_name: &'a str,
    pub message_data: String,
    pub message: &'a str,
    pub timestamp: i64,
    pub origin_message: i32,
}

impl<'a> StoredMessageRow<'a> {
    pub fn new(record: &'a DeliveryRecord) -> Self {
        Self {
            sender_id: record.sender_id.into_inner(),
            sender_name: &record.sender_display_name,
            message_data: encode_deliveries(&record.deliveries),
            message: &record.message_text,
            timestamp: record.timestamp,
            origin_message: record.origin_message.into_inner(),
        }
    }
}
