//! Reaction updates

use crate::inbound;
use crate::server::BotState;
use radio_common::AppResult;
use radio_core::{ChatId, MessageId};
use radio_service::ReactionService;
use teloxide::types::{MessageReactionUpdated, ReactionType};
use tracing::debug;

/// First plain emoji among the new reactions; custom emoji are not mirrored
fn first_emoji(reactions: &[ReactionType]) -> Option<&str> {
    reactions.iter().find_map(|reaction| match reaction {
        ReactionType::Emoji { emoji } => Some(emoji.as_str()),
        _ => None,
    })
}

pub(super) async fn handle(state: &BotState, update: MessageReactionUpdated) -> AppResult<()> {
    let Some(reactor) = update.user.as_ref().map(inbound::user_id) else {
        return Ok(());
    };
    let Some(emoji) = first_emoji(&update.new_reaction) else {
        debug!(user_id = %reactor, "Reaction removed or not a plain emoji");
        return Ok(());
    };

    let applied = ReactionService::new(state.service_context())
        .propagate(
            reactor,
            ChatId::new(update.chat.id.0),
            MessageId::new(update.message_id.0),
            emoji.to_string(),
        )
        .await?;
    debug!(user_id = %reactor, applied, "Reaction mirrored");
    Ok(())
}
