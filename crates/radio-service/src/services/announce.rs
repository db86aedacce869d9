//! Owner announcements: version updates and mass broadcasts

use std::path::Path;

use governor::{Quota, RateLimiter as Governor};
use radio_core::{Badge, ChatId, DeliveryError, SendText, UserId};
use tracing::{info, instrument, warn};
use validator::Validate;

use super::context::ServiceContext;
use super::directory::DirectoryService;
use super::error::{ServiceError, ServiceResult};
use crate::dto::{BroadcastRequest, VersionAnnouncement};
use crate::notices::{self, OWNER_BADGE, SYSTEM_BADGE};

/// Version shown when no marker file exists yet
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Announcement service
pub struct AnnounceService<'a> {
    ctx: &'a ServiceContext,
    version_file: &'a Path,
}

impl<'a> AnnounceService<'a> {
    /// Create a new AnnounceService
    pub fn new(ctx: &'a ServiceContext, version_file: &'a Path) -> Self {
        Self { ctx, version_file }
    }

    /// Version marker, or the default when the file is missing or empty
    pub async fn current_version(&self) -> String {
        match tokio::fs::read_to_string(self.version_file).await {
            Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
            _ => DEFAULT_VERSION.to_string(),
        }
    }

    /// Store the new version and announce it to the announcement chat and
    /// every user. Returns the number of users reached, the moderator excluded.
    #[instrument(skip(self, announcement), fields(version = %announcement.version))]
    pub async fn announce_version(
        &self,
        moderator: UserId,
        announcement: VersionAnnouncement,
        announcement_chat: Option<ChatId>,
    ) -> ServiceResult<usize> {
        announcement.validate()?;

        tokio::fs::write(self.version_file, &announcement.version)
            .await
            .map_err(|e| ServiceError::internal(format!("failed to write version file: {e}")))?;

        let text = notices::version_update(&announcement.version, &announcement.notes);

        if let Some(chat) = announcement_chat {
            if let Err(e) = self
                .ctx
                .messenger()
                .send_text(SendText::html(chat, text.clone()))
                .await
            {
                warn!(chat = %chat, error = %e, "Failed to post update to announcement chat");
            }
        }

        let mut sent = 0;
        for user in self.ctx.user_repo().find_all().await? {
            let request = SendText::html(user.user_id, text.clone()).badge(Badge::system(SYSTEM_BADGE));
            match self.ctx.messenger().send_text(request).await {
                Ok(_) if user.user_id != moderator => sent += 1,
                Ok(_) => {}
                Err(e) => self.on_failure(user.user_id, e).await?,
            }
        }

        info!(sent, "Version update announced");
        Ok(sent)
    }

    /// Send `request` to every user, paced by the broadcast delay.
    /// Returns the number of users reached.
    #[instrument(skip(self, request))]
    pub async fn broadcast(&self, request: BroadcastRequest) -> ServiceResult<usize> {
        request.validate()?;

        let text = request.normalized_text();
        let pacer = Quota::with_period(self.ctx.rate_config().broadcast_delay()).map(Governor::direct);

        let mut sent = 0;
        for user in self.ctx.user_repo().find_all().await? {
            if let Some(pacer) = &pacer {
                pacer.until_ready().await;
            }
            let request = SendText::html(user.user_id, text.clone()).badge(Badge::owner(OWNER_BADGE));
            match self.ctx.messenger().send_text(request).await {
                Ok(_) => sent += 1,
                Err(e) => self.on_failure(user.user_id, e).await?,
            }
        }

        info!(sent, "Broadcast sent");
        Ok(sent)
    }

    async fn on_failure(&self, user_id: UserId, error: DeliveryError) -> ServiceResult<()> {
        if error.is_unreachable() {
            return DirectoryService::new(self.ctx).purge(user_id).await;
        }
        warn!(user_id = %user_id, error = %error, "Announcement delivery failed");
        Ok(())
    }
}
