//! Relay of ordinary messages
//!
//! Gate the sender, post a pending status, fan out, then turn the status into
//! the delivery report and let it expire. A failed fan-out drops the status.

use super::{expire_status, reply, reply_status};
use crate::inbound;
use crate::replies;
use crate::server::BotState;
use radio_common::AppResult;
use radio_core::{
    ChatId, DeleteMessage, EditText, MessageId, Messenger, Payload, TextFormat, UserId,
};
use radio_service::dto::{DeliveryReport, Intake};
use radio_service::services::remaining_secs;
use radio_service::FanoutDispatcher;
use std::time::Instant;
use teloxide::types::Message;
use tracing::{debug, warn};

pub(super) async fn handle(state: &BotState, msg: &Message, sender: UserId) -> AppResult<()> {
    let Some(payload) = inbound::payload(msg) else {
        debug!(user_id = %sender, "Ignoring message without relayable content");
        return Ok(());
    };
    let chat = inbound::chat_id(msg);
    let dispatcher = FanoutDispatcher::new(state.service_context());

    let user = match dispatcher.admit(sender, Instant::now()).await? {
        Intake::Accepted(user) => user,
        Intake::RateLimited(wait) => {
            reply(state, chat, replies::rate_limited(remaining_secs(wait))).await?;
            return Ok(());
        }
        Intake::Unregistered => {
            reply(state, chat, replies::UNREGISTERED_SENDER).await?;
            return Ok(());
        }
        Intake::Imprisoned(remaining) => {
            reply(state, chat, replies::imprisoned(remaining)).await?;
            return Ok(());
        }
    };

    let is_media = matches!(payload, Payload::Media { .. });
    let pending_text = if is_media {
        let members = state
            .service_context()
            .user_repo()
            .find_by_channel(user.channel)
            .await?;
        replies::media_pending(user.channel, members.len().saturating_sub(1))
    } else {
        replies::SENDING.to_string()
    };
    let pending = match reply(state, chat, pending_text).await {
        Ok(message) => Some(message),
        Err(e) => {
            warn!(chat = %chat, error = %e, "Failed to post pending status");
            None
        }
    };

    let report = match dispatcher
        .broadcast(&user, inbound::message_id(msg), payload)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            discard_status(state.service_context().messenger(), chat, pending).await;
            return Err(e.into());
        }
    };

    let text = report_text(&report, is_media);
    finish_status(state, chat, pending, text).await
}

fn report_text(report: &DeliveryReport, is_media: bool) -> String {
    match report {
        DeliveryReport::NoRecipients { channel } => replies::empty_channel(*channel),
        DeliveryReport::Delivered {
            channel,
            delivered,
            recipients,
            elapsed,
            ..
        } => {
            if is_media {
                replies::media_delivered(*channel, *delivered, *recipients, *elapsed)
            } else {
                replies::text_delivered(*channel, *delivered, *elapsed)
            }
        }
    }
}

/// Turn the pending status into the report, or post the report fresh when
/// there is no pending message to edit
async fn finish_status(
    state: &BotState,
    chat: ChatId,
    pending: Option<MessageId>,
    text: String,
) -> AppResult<()> {
    let Some(message) = pending else {
        return reply_status(state, chat, text).await;
    };

    let request = EditText {
        chat,
        message,
        text,
        format: TextFormat::Html,
    };
    if let Err(e) = state.service_context().messenger().edit_text(request).await {
        warn!(chat = %chat, error = %e, "Failed to update delivery status");
    }
    expire_status(state, chat, message);
    Ok(())
}

/// Remove the pending status of a fan-out that failed
async fn discard_status(messenger: &dyn Messenger, chat: ChatId, pending: Option<MessageId>) {
    let Some(message) = pending else {
        return;
    };
    if let Err(e) = messenger.delete_message(DeleteMessage { chat, message }).await {
        debug!(chat = %chat, error = %e, "Pending status already gone");
    }
}
