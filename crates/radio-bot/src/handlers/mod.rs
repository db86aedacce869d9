//! Update handlers
//!
//! `handle_update` is the dispatch boundary: every failure below it is logged
//! here with its error code, and the caller gets a reply matching the error.

mod callbacks;
mod commands;
mod reactions;
mod relay;

use crate::inbound;
use crate::replies;
use crate::server::BotState;
use radio_common::{AppError, AppResult};
use radio_core::{ChatId, DeleteMessage, MessageId, SendText};
use radio_service::commands::Verb;
use teloxide::types::{Message, Update, UpdateKind};
use tracing::{debug, error, warn};

/// Handle one update; runs on its own task
pub async fn handle_update(state: BotState, update: Update) {
    match update.kind {
        UpdateKind::Message(msg) => handle_message(&state, &msg).await,
        UpdateKind::CallbackQuery(query) => {
            if let Err(e) = callbacks::handle(&state, query).await {
                warn!(error = %e, code = e.error_code(), "Callback query failed");
            }
        }
        UpdateKind::MessageReaction(reaction) => {
            if let Err(e) = reactions::handle(&state, reaction).await {
                warn!(error = %e, code = e.error_code(), "Reaction mirroring failed");
            }
        }
        other => debug!(kind = ?other, "Ignoring update"),
    }
}

async fn handle_message(state: &BotState, msg: &Message) {
    // The relay lives in private chats only
    if !msg.chat.is_private() {
        return;
    }
    let Some(sender) = inbound::sender(msg) else {
        return;
    };
    let chat = inbound::chat_id(msg);

    let invocation = msg.text().and_then(Verb::parse);
    let result = match invocation {
        Some(invocation) => commands::handle(state, msg, sender, invocation).await,
        None => relay::handle(state, msg, sender).await,
    };

    if let Err(e) = result {
        if e.is_server_error() {
            error!(user_id = %sender, error = ?e, code = e.error_code(), "Handler failed");
        } else {
            debug!(user_id = %sender, error = %e, code = e.error_code(), "Request rejected");
        }
        if let Err(send_error) = reply(state, chat, replies::for_error(&e)).await {
            warn!(chat = %chat, error = %send_error, "Failed to report error to user");
        }
    }
}

/// Send an HTML reply
pub(crate) async fn reply(
    state: &BotState,
    chat: ChatId,
    text: impl Into<String>,
) -> AppResult<MessageId> {
    state
        .service_context()
        .messenger()
        .send_text(SendText::html(chat, text))
        .await
        .map_err(|e| AppError::Transport(e.to_string()))
}

/// Send an HTML reply that removes itself after the status lifetime
pub(crate) async fn reply_status(
    state: &BotState,
    chat: ChatId,
    text: impl Into<String>,
) -> AppResult<()> {
    let message = reply(state, chat, text).await?;
    expire_status(state, chat, message);
    Ok(())
}

/// Delete `message` once the status lifetime has passed
pub(crate) fn expire_status(state: &BotState, chat: ChatId, message: MessageId) {
    let state = state.clone();
    let ttl = state.config().rate_limit.status_ttl();
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        let request = DeleteMessage { chat, message };
        if let Err(e) = state.service_context().messenger().delete_message(request).await {
            debug!(chat = %chat, error = %e, "Status message already gone");
        }
    });
}
