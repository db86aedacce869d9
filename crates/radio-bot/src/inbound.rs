//! Conversions from inbound Telegram updates into domain values

use radio_core::{ChatId, MediaKind, MessageId, Payload, ReplyContext, UserId};
use teloxide::types::{Message, MessageKind, User};

type TgMediaKind = teloxide::types::MediaKind;

pub fn user_id(user: &User) -> UserId {
    UserId::new(user.id.0 as i64)
}

pub fn chat_id(msg: &Message) -> ChatId {
    ChatId::new(msg.chat.id.0)
}

pub fn message_id(msg: &Message) -> MessageId {
    MessageId::new(msg.id.0)
}

/// Sender of a message, when Telegram names one
pub fn sender(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(user_id)
}

/// Relayable content of `msg`; `None` for service messages and unsupported
/// media such as voice notes or polls
pub fn payload(msg: &Message) -> Option<Payload> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };

    match &common.media_kind {
        TgMediaKind::Text(text) => Some(Payload::Text {
            text: text.text.clone(),
            reply: msg.reply_to_message().map(reply_context),
        }),
        TgMediaKind::Photo(photo) => photo.photo.last().map(|size| Payload::Media {
            kind: MediaKind::Photo,
            file_id: size.file.id.clone(),
            caption: photo.caption.clone(),
        }),
        TgMediaKind::Video(video) => Some(Payload::Media {
            kind: MediaKind::Video,
            file_id: video.video.file.id.clone(),
            caption: video.caption.clone(),
        }),
        TgMediaKind::Animation(animation) => Some(Payload::Media {
            kind: MediaKind::Animation,
            file_id: animation.animation.file.id.clone(),
            caption: animation.caption.clone(),
        }),
        TgMediaKind::Document(document) => Some(Payload::Media {
            kind: MediaKind::Document,
            file_id: document.document.file.id.clone(),
            caption: document.caption.clone(),
        }),
        TgMediaKind::Sticker(sticker) => Some(Payload::Media {
            kind: MediaKind::Sticker,
            file_id: sticker.sticker.file.id.clone(),
            caption: None,
        }),
        _ => None,
    }
}

fn reply_context(replied: &Message) -> ReplyContext {
    let author = replied.from.as_ref();
    ReplyContext {
        message_id: message_id(replied),
        text: replied
            .text()
            .or_else(|| replied.caption())
            .unwrap_or_default()
            .to_string(),
        author_id: author.map(user_id),
        author_fallback_name: author.map(|u| u.first_name.clone()).unwrap_or_default(),
    }
}
