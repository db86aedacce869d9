//! Badge button presses

use crate::server::BotState;
use radio_common::{AppError, AppResult};
use radio_core::BadgeKind;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

/// Alert text for a pressed badge
fn badge_alert(kind: BadgeKind) -> &'static str {
    match kind {
        BadgeKind::Name => "Это имя пользователя",
        BadgeKind::System => "Это системное сообщение",
        BadgeKind::Owner => "Это рассылка от владельца",
    }
}

pub(super) async fn handle(state: &BotState, query: CallbackQuery) -> AppResult<()> {
    let kind = query.data.as_deref().and_then(BadgeKind::from_callback_data);

    let mut answer = state.bot().answer_callback_query(&query.id);
    if let Some(kind) = kind {
        answer = answer.text(badge_alert(kind)).show_alert(true);
    }
    answer
        .await
        .map_err(|e| AppError::Transport(format!("answerCallbackQuery failed: {e}")))?;
    Ok(())
}
