//! User directory service
//!
//! Onboarding, display-name changes, and removal of unreachable users.

use radio_core::{ChatId, DomainError, MessageId, UserId, UserRecord};
use tracing::{info, instrument};
use validator::Validate;

use super::channel::ChannelService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use crate::dto::{EmojiRequest, NameRequest, Onboarding};

/// Directory service
pub struct DirectoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DirectoryService<'a> {
    /// Create a new DirectoryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register `user_id` on the least populated channel, or report the
    /// existing record. Repeated calls never create a second record.
    #[instrument(skip(self))]
    pub async fn onboard(&self, user_id: UserId) -> ServiceResult<Onboarding> {
        if let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? {
            let population = self.population_of(&user).await?;
            return Ok(Onboarding {
                user,
                created: false,
                population,
            });
        }

        let channel = ChannelService::new(self.ctx)
            .least_populated_channel()
            .await?;
        let candidate = UserRecord::new(user_id, channel, self.ctx.generate_name());
        let created = self.ctx.user_repo().create_if_absent(&candidate).await?;

        // Lost a race against a concurrent /start: report the stored record
        let user = if created {
            info!(user_id = %user_id, channel = %channel, "User onboarded");
            candidate
        } else {
            self.get(user_id).await?
        };

        let population = self.population_of(&user).await?;
        Ok(Onboarding {
            user,
            created,
            population,
        })
    }

    /// Load a user or fail with `UserNotFound`
    pub async fn get(&self, user_id: UserId) -> ServiceResult<UserRecord> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id).into())
    }

    /// Set a custom display name after policy checks
    #[instrument(skip(self))]
    pub async fn set_custom_name(
        &self,
        user_id: UserId,
        request: NameRequest,
    ) -> ServiceResult<UserRecord> {
        request.validate()?;
        self.ctx
            .name_policy()
            .is_name_allowed(&request.name, user_id)
            .map_err(DomainError::from)?;

        let mut user = self.get(user_id).await?;
        user.custom_name = Some(request.name);
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "Custom name set");
        Ok(user)
    }

    /// Drop the custom name; the generated one shows again
    #[instrument(skip(self))]
    pub async fn reset_name(&self, target: UserId) -> ServiceResult<UserRecord> {
        let mut user = self.get(target).await?;
        user.custom_name = None;
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %target, "Custom name reset");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn set_emoji(&self, request: EmojiRequest) -> ServiceResult<UserRecord> {
        request.validate()?;

        let mut user = self.get(request.target).await?;
        user.emoji = Some(request.emoji);
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %request.target, "Emoji set");
        Ok(user)
    }

    /// Who wrote the message `(chat, message)`: the original sender when it is
    /// a relayed copy, otherwise the platform author
    pub async fn author_of(
        &self,
        chat: ChatId,
        message: MessageId,
        platform_author: Option<UserId>,
    ) -> ServiceResult<Option<UserId>> {
        let record = self.ctx.delivery_log().find_by_copy(chat, message).await?;
        Ok(record.map(|r| r.sender_id).or(platform_author))
    }

    /// Forget a user the platform reports as unreachable
    #[instrument(skip(self))]
    pub async fn purge(&self, user_id: UserId) -> ServiceResult<()> {
        let removed = self.ctx.user_repo().delete(user_id).await?;
        self.ctx.prison_repo().delete(user_id).await?;
        self.ctx.rate_limiter().forget(user_id);

        if removed {
            info!(user_id = %user_id, "Purged unreachable user");
        }
        Ok(())
    }

    async fn population_of(&self, user: &UserRecord) -> ServiceResult<usize> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_channel(user.channel)
            .await?
            .len())
    }
}
