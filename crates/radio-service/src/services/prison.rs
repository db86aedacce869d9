//! Prison registry service
//!
//! Suspension moves a user onto the reserved prison channel and blocks their
//! outgoing messages. Terms are never swept: an expired entry stays enforced
//! until a moderator releases the user.

use chrono::Utc;
use radio_core::{ChannelId, DomainError, PrisonEntry, PrisonTerm, Remaining, SendText, UserId};
use tracing::{info, instrument, warn};

use super::channel::ChannelService;
use super::context::ServiceContext;
use super::directory::DirectoryService;
use super::error::ServiceResult;
use crate::dto::SuspendOutcome;
use crate::notices;

/// Prison service
pub struct PrisonService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PrisonService<'a> {
    /// Create a new PrisonService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Suspend `target` for `term`, replacing any earlier entry
    #[instrument(skip(self))]
    pub async fn suspend(&self, target: UserId, term: PrisonTerm) -> ServiceResult<SuspendOutcome> {
        let mut user = DirectoryService::new(self.ctx).get(target).await?;

        let entry = PrisonEntry::new(target, term.reason_or_default(), term.until);
        self.ctx.prison_repo().upsert(&entry).await?;

        let prison = self.ctx.channel_config().prison();
        user.channel = prison;
        self.ctx.user_repo().update(&user).await?;

        self.notify(target, notices::suspended(prison)).await?;

        info!(user_id = %target, until = ?entry.until, "User suspended");
        Ok(SuspendOutcome {
            user,
            entry,
            given_reason: term.reason,
        })
    }

    /// Lift the suspension and put the user on a random channel.
    /// Returns the new channel, `None` when the user record is gone.
    #[instrument(skip(self))]
    pub async fn release(&self, target: UserId) -> ServiceResult<Option<ChannelId>> {
        if !self.ctx.prison_repo().delete(target).await? {
            return Err(DomainError::NotImprisoned(target).into());
        }

        let Some(mut user) = self.ctx.user_repo().find_by_id(target).await? else {
            info!(user_id = %target, "Released user without a directory record");
            return Ok(None);
        };

        let channel = ChannelService::new(self.ctx).random_channel().await?;
        user.channel = channel;
        self.ctx.user_repo().update(&user).await?;

        self.notify(target, notices::released(channel)).await?;

        info!(user_id = %target, channel = %channel, "User released");
        Ok(Some(channel))
    }

    /// Current entry of `user_id`, expired ones included
    pub async fn is_suspended(&self, user_id: UserId) -> ServiceResult<Option<PrisonEntry>> {
        Ok(self.ctx.prison_repo().find(user_id).await?)
    }

    /// Time left on `entry` right now
    pub fn remaining(&self, entry: &PrisonEntry) -> Remaining {
        entry.remaining(Utc::now().timestamp())
    }

    async fn notify(&self, target: UserId, text: String) -> ServiceResult<()> {
        if let Err(e) = self
            .ctx
            .messenger()
            .send_text(SendText::html(target, text))
            .await
        {
            if e.is_unreachable() {
                return DirectoryService::new(self.ctx).purge(target).await;
            }
            warn!(user_id = %target, error = %e, "Failed to notify user");
        }
        Ok(())
    }
}
