//! Command handlers
//!
//! Capability check first, then argument parsing, then one service call.
//! Parse failures answer with a usage reply and change nothing.

use super::{reply, reply_status};
use crate::inbound;
use crate::replies;
use crate::server::BotState;
use chrono::Utc;
use radio_common::{AppError, AppResult};
use radio_core::{Badge, Capabilities, ChatId, DomainError, PrisonTerm, SendText, UserId};
use radio_service::commands::{Command, Invocation, Target, Verb};
use radio_service::dto::EmojiRequest;
use radio_service::{
    AnnounceService, ChannelService, DirectoryService, FanoutDispatcher, PrisonService,
};
use teloxide::types::Message;
use tracing::{info, instrument, warn};

/// Run one recognized command
#[instrument(skip(state, msg, invocation), fields(verb = ?invocation.verb))]
pub(super) async fn handle(
    state: &BotState,
    msg: &Message,
    caller: UserId,
    invocation: Invocation<'_>,
) -> AppResult<()> {
    let chat = inbound::chat_id(msg);
    let verb = invocation.verb;

    state
        .service_context()
        .require(caller, verb.required_capability())?;

    if let Some(alias) = invocation.alias {
        reply(state, chat, replies::alias_notice(alias)).await?;
    }

    let command = match invocation.into_command(msg.reply_to_message().is_some()) {
        Ok(command) => command,
        Err(usage) => {
            reply(state, chat, replies::usage(usage)).await?;
            return Ok(());
        }
    };

    let result = execute(state, msg, chat, caller, command).await;

    // Failures of these two also go to the owner
    if let Err(e) = &result {
        if e.is_server_error() && matches!(verb, Verb::Start | Verb::Broadcast) {
            alert_owner(state, verb, e).await;
        }
    }
    result
}

async fn execute(
    state: &BotState,
    msg: &Message,
    chat: ChatId,
    caller: UserId,
    command: Command,
) -> AppResult<()> {
    let ctx = state.service_context();

    match command {
        Command::Start => {
            let onboarding = DirectoryService::new(ctx).onboard(caller).await?;
            if onboarding.created {
                state.rotation().schedule(caller);
            }
            reply(state, chat, replies::start(&onboarding)).await?;
        }
        Command::Help => {
            let version = AnnounceService::new(ctx, &state.config().bot.version_file)
                .current_version()
                .await;
            let moderator = ctx.capabilities(caller).allows(Capabilities::MODERATE);
            reply(state, chat, replies::help(&version, moderator)).await?;
        }
        Command::Scan => {
            let channels = ChannelService::new(ctx).scan().await?;
            reply(state, chat, replies::scan(&channels)).await?;
        }
        Command::Goto(channel) => {
            let user = ChannelService::new(ctx).goto(caller, channel).await?;
            let request = SendText::html(chat, replies::goto_done(user.channel))
                .badge(Badge::name(user.display_name()));
            ctx.messenger()
                .send_text(request)
                .await
                .map_err(|e| AppError::Transport(e.to_string()))?;
        }
        Command::Name(request) => {
            let name = request.name.clone();
            match DirectoryService::new(ctx).set_custom_name(caller, request).await {
                Ok(_) => reply(state, chat, replies::name_set(&name)).await?,
                Err(e) => match AppError::from(e) {
                    AppError::Domain(DomainError::UserNotFound(_)) => {
                        reply(state, chat, replies::REGISTER_FIRST).await?
                    }
                    other => return Err(other),
                },
            };
        }
        Command::ResetName(target) => {
            let target = resolve_target(state, msg, target).await?;
            DirectoryService::new(ctx).reset_name(target).await?;
            reply(state, chat, replies::NAME_RESET).await?;
        }
        Command::Emoji { target, emoji } => {
            let target = resolve_target(state, msg, target).await?;
            let request = EmojiRequest {
                target,
                emoji: emoji.clone(),
            };
            DirectoryService::new(ctx).set_emoji(request).await?;
            reply(state, chat, replies::emoji_set(&emoji)).await?;
        }
        Command::Version(announcement) => {
            let config = state.config();
            let sent = AnnounceService::new(ctx, &config.bot.version_file)
                .announce_version(caller, announcement, config.bot.announcement_chat)
                .await?;
            reply(state, chat, replies::version_sent(sent)).await?;
        }
        Command::Broadcast(request) => {
            let sent = AnnounceService::new(ctx, &state.config().bot.version_file)
                .broadcast(request)
                .await?;
            reply_status(state, chat, replies::broadcast_sent(sent)).await?;
        }
        Command::Zov { target, term } => {
            let words: Vec<&str> = term.iter().map(String::as_str).collect();
            let term = PrisonTerm::parse(&words, Utc::now().timestamp());
            let prison = PrisonService::new(ctx);
            let outcome = prison.suspend(target, term).await?;
            let remaining = prison.remaining(&outcome.entry);
            reply(state, chat, replies::suspended(&outcome, remaining)).await?;
        }
        Command::Unzov(target) => {
            PrisonService::new(ctx).release(target).await?;
            reply(state, chat, replies::RELEASED).await?;
        }
        Command::Del => {
            let Some(replied) = msg.reply_to_message() else {
                return Err(AppError::InvalidInput("del needs a reply".to_string()));
            };
            let deleted = FanoutDispatcher::new(ctx)
                .delete_fanout(chat, inbound::message_id(replied))
                .await?;
            reply_status(state, chat, replies::deleted(deleted)).await?;
        }
    }

    Ok(())
}

/// The user a moderator command acts on. A reply targets the original
/// sender of a relayed copy, or the author of the replied message.
async fn resolve_target(state: &BotState, msg: &Message, target: Target) -> AppResult<UserId> {
    match target {
        Target::Id(user) => Ok(user),
        Target::Reply => {
            let replied = msg
                .reply_to_message()
                .ok_or_else(|| AppError::InvalidInput("reply target missing".to_string()))?;
            let author = DirectoryService::new(state.service_context())
                .author_of(
                    inbound::chat_id(msg),
                    inbound::message_id(replied),
                    inbound::sender(replied),
                )
                .await?;
            author.ok_or_else(|| AppError::not_found("reply author"))
        }
    }
}

async fn alert_owner(state: &BotState, verb: Verb, error: &AppError) {
    let owner = state.service_context().owner_id();
    let command = match verb {
        Verb::Start => "start",
        _ => "broadcast",
    };
    let request = SendText::html(owner, replies::owner_alert(command, error));
    match state.service_context().messenger().send_text(request).await {
        Ok(_) => info!(owner = %owner, "Owner alerted about failed command"),
        Err(e) => warn!(error = %e, "Failed to alert owner"),
    }
}
