//! Long-polling loop
//!
//! Pulls updates with `getUpdates` and hands each one to its own task, so a
//! slow fan-out or a failing handler never holds up the next update.

use super::state::BotState;
use crate::handlers;
use radio_common::AppError;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, BotCommand};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info, warn};

/// Long-poll timeout in seconds
const POLL_TIMEOUT_SECS: u32 = 30;

/// Pause after a failed `getUpdates`
const RETRY_DELAY: Duration = Duration::from_secs(5);

fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Твой канал и имя"),
        BotCommand::new("help", "Справка"),
        BotCommand::new("scan", "Найти активные каналы"),
        BotCommand::new("goto", "Перейти на канал"),
        BotCommand::new("name", "Сменить имя"),
    ]
}

/// Poll until Ctrl-C or until another instance takes over the token
pub async fn run_polling(state: BotState) -> Result<(), AppError> {
    let bot = state.bot().clone();

    let me = bot
        .get_me()
        .await
        .map_err(|e| AppError::Transport(format!("getMe failed: {e}")))?;

    // Long polling only works without a webhook
    bot.delete_webhook()
        .send()
        .await
        .map_err(|e| AppError::Transport(format!("deleteWebhook failed: {e}")))?;

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!(username = ?me.username, "Bot connected, starting long polling");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(POLL_TIMEOUT_SECS)
            .allowed_updates(vec![
                AllowedUpdate::Message,
                AllowedUpdate::CallbackQuery,
                AllowedUpdate::MessageReaction,
            ]);

        let result = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping polling");
                return Ok(());
            }
            result = request.send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "Got updates");
                for update in updates {
                    offset = update.id.as_offset();
                    tokio::spawn(handlers::handle_update(state.clone(), update));
                }
            }
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                return Err(AppError::Transport(
                    "another instance is already polling with this token".to_string(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
