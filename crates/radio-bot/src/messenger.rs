//! Telegram implementation of the [`Messenger`] port
//!
//! Maps the structured requests onto Bot API calls, attaches the badge as a
//! single inline button, and retries `RetryAfter` responses a bounded number
//! of times before giving up.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use radio_core::{
    Badge, ChatId, DeleteMessage, DeliveryError, DeliveryResult, EditText, MediaKind, MessageId,
    Messenger, SendMedia, SendText, SetReaction, TextFormat,
};
use teloxide::payloads::{
    EditMessageTextSetters, SendAnimationSetters, SendDocumentSetters, SendMessageSetters,
    SendPhotoSetters, SendStickerSetters, SendVideoSetters, SetMessageReactionSetters,
};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, ReactionType,
    ReplyParameters,
};
use teloxide::{ApiError, RequestError};
use tracing::warn;

const TELEGRAM_RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Outbound sender backed by a teloxide [`Bot`]
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        chat: ChatId,
        mut request: F,
    ) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let mut retries = 0usize;

        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let Some(wait) = retry_after_duration(&err) else {
                        return Err(err);
                    };

                    if retries >= TELEGRAM_RETRY_AFTER_MAX_RETRIES {
                        warn!(
                            chat = %chat,
                            operation,
                            retries,
                            retry_after_secs = wait.as_secs(),
                            "Telegram rate limit persisted after retries"
                        );
                        return Err(err);
                    }

                    retries += 1;
                    warn!(
                        chat = %chat,
                        operation,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "Telegram rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, request: SendText) -> DeliveryResult<MessageId> {
        let chat = tg_chat(request.chat);
        let markup = request.badge.as_ref().map(badge_markup);

        let message = self
            .with_retry("send message", request.chat, || {
                let mut req = self.bot.send_message(chat, request.text.clone());
                if request.format == TextFormat::Html {
                    req = req.parse_mode(ParseMode::Html);
                }
                if let Some(reply_to) = request.reply_to {
                    req = req.reply_parameters(
                        ReplyParameters::new(tg_message(reply_to)).allow_sending_without_reply(),
                    );
                }
                if let Some(markup) = &markup {
                    req = req.reply_markup(markup.clone());
                }
                async move { req.await }
            })
            .await
            .map_err(|e| map_request_error(&e))?;

        Ok(MessageId::new(message.id.0))
    }

    async fn send_media(&self, request: SendMedia) -> DeliveryResult<MessageId> {
        let chat = tg_chat(request.chat);
        let markup = request.badge.as_ref().map(badge_markup);
        let caption = request.caption.clone();

        let message = self
            .with_retry("send media", request.chat, || {
                let file = InputFile::file_id(request.file_id.clone());
                let bot = self.bot.clone();
                let markup = markup.clone();
                let caption = caption.clone();
                let kind = request.kind;
                async move {
                    match kind {
                        MediaKind::Photo => {
                            let mut req = bot.send_photo(chat, file);
                            if let Some(caption) = caption {
                                req = req.caption(caption);
                            }
                            if let Some(markup) = markup {
                                req = req.reply_markup(markup);
                            }
                            req.await
                        }
                        MediaKind::Video => {
                            let mut req = bot.send_video(chat, file);
                            if let Some(caption) = caption {
                                req = req.caption(caption);
                            }
                            if let Some(markup) = markup {
                                req = req.reply_markup(markup);
                            }
                            req.await
                        }
                        MediaKind::Animation => {
                            let mut req = bot.send_animation(chat, file);
                            if let Some(caption) = caption {
                                req = req.caption(caption);
                            }
                            if let Some(markup) = markup {
                                req = req.reply_markup(markup);
                            }
                            req.await
                        }
                        MediaKind::Document => {
                            let mut req = bot.send_document(chat, file);
                            if let Some(caption) = caption {
                                req = req.caption(caption);
                            }
                            if let Some(markup) = markup {
                                req = req.reply_markup(markup);
                            }
                            req.await
                        }
                        MediaKind::Sticker => {
                            let mut req = bot.send_sticker(chat, file);
                            if let Some(markup) = markup {
                                req = req.reply_markup(markup);
                            }
                            req.await
                        }
                    }
                }
            })
            .await
            .map_err(|e| map_request_error(&e))?;

        Ok(MessageId::new(message.id.0))
    }

    async fn edit_text(&self, request: EditText) -> DeliveryResult<()> {
        let chat = tg_chat(request.chat);
        let message = tg_message(request.message);

        let result = self
            .with_retry("edit message", request.chat, || {
                let mut req = self
                    .bot
                    .edit_message_text(chat, message, request.text.clone());
                if request.format == TextFormat::Html {
                    req = req.parse_mode(ParseMode::Html);
                }
                async move { req.await }
            })
            .await;

        match result {
            // Same text twice is not a failure
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(map_request_error(&e)),
        }
    }

    async fn delete_message(&self, request: DeleteMessage) -> DeliveryResult<()> {
        let chat = tg_chat(request.chat);
        let message = tg_message(request.message);

        self.with_retry("delete message", request.chat, || {
            let req = self.bot.delete_message(chat, message);
            async move { req.await }
        })
        .await
        .map_err(|e| map_request_error(&e))?;
        Ok(())
    }

    async fn set_reaction(&self, request: SetReaction) -> DeliveryResult<()> {
        let chat = tg_chat(request.chat);
        let message = tg_message(request.message);

        self.with_retry("set reaction", request.chat, || {
            let req = self
                .bot
                .set_message_reaction(chat, message)
                .reaction(vec![ReactionType::Emoji {
                    emoji: request.emoji.clone(),
                }]);
            async move { req.await }
        })
        .await
        .map_err(|e| map_request_error(&e))?;
        Ok(())
    }
}

/// One inline button carrying the badge label
pub fn badge_markup(badge: &Badge) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        badge.label.clone(),
        badge.kind.callback_data(),
    )]])
}

pub fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.into_inner())
}

pub fn tg_message(message: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message.into_inner())
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

/// Classify a failed call; recipients that can never be reached again get
/// their own variants
fn map_request_error(error: &RequestError) -> DeliveryError {
    match error {
        RequestError::Api(ApiError::BotBlocked | ApiError::BotKicked) => DeliveryError::Blocked,
        RequestError::Api(ApiError::ChatNotFound | ApiError::CantInitiateConversation) => {
            DeliveryError::NotFound
        }
        RequestError::Api(ApiError::UserDeactivated) => DeliveryError::Deactivated,
        other => DeliveryError::Other(other.to_string()),
    }
}
