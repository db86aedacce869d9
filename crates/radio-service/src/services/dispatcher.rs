//! Fan-out dispatcher
//!
//! Delivers one inbound message to every other member of the sender's
//! channel. All sends run concurrently and fail independently; recipients the
//! platform reports unreachable are purged afterwards. Successful copies are
//! written to the delivery log and the reaction map.

use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use radio_core::{
    Badge, ChatId, DeleteMessage, Delivery, DeliveryRecord, DeliveryResult, DomainError, MediaKind,
    MessageId, Payload, ReplyContext, SendMedia, SendText, UserId, UserRecord,
};
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;
use super::directory::DirectoryService;
use super::error::ServiceResult;
use crate::dto::{DeliveryReport, Intake};
use crate::notices;

const QUOTE_HEAD: &str = "╭─";
const QUOTE_TAIL: &str = "╰";

/// Fan-out dispatcher
pub struct FanoutDispatcher<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FanoutDispatcher<'a> {
    /// Create a new FanoutDispatcher
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Gate an inbound relay message: rate limit first, then registration
    /// and prison. A suspended sender's rate timer is cleared.
    #[instrument(skip(self))]
    pub async fn admit(&self, sender: UserId, now: Instant) -> ServiceResult<Intake> {
        if let Err(wait) = self.ctx.rate_limiter().check(sender, now) {
            return Ok(Intake::RateLimited(wait));
        }

        let Some(user) = self.ctx.user_repo().find_by_id(sender).await? else {
            return Ok(Intake::Unregistered);
        };

        if let Some(entry) = self.ctx.prison_repo().find(sender).await? {
            self.ctx.rate_limiter().forget(sender);
            return Ok(Intake::Imprisoned(
                entry.remaining(Utc::now().timestamp()),
            ));
        }

        Ok(Intake::Accepted(user))
    }

    /// Deliver `payload` from `sender` to the rest of their channel.
    /// `origin` is the sender's own message id.
    #[instrument(skip(self, sender, payload), fields(sender = %sender.user_id, channel = %sender.channel))]
    pub async fn broadcast(
        &self,
        sender: &UserRecord,
        origin: MessageId,
        payload: Payload,
    ) -> ServiceResult<DeliveryReport> {
        let channel = sender.channel;
        let members = self.ctx.user_repo().find_by_channel(channel).await?;
        let recipients: Vec<UserId> = members
            .iter()
            .map(|member| member.user_id)
            .filter(|id| *id != sender.user_id)
            .collect();

        if recipients.is_empty() {
            return Ok(DeliveryReport::NoRecipients { channel });
        }

        let badge = Badge::name(sender.display_name());
        let started = Instant::now();

        let (results, own_copy) = match &payload {
            Payload::Text { text, reply } => {
                self.fan_out_text(sender, &recipients, text, reply.as_ref(), &badge)
                    .await?
            }
            Payload::Media {
                kind,
                file_id,
                caption,
            } => {
                let results = self
                    .fan_out_media(&recipients, *kind, file_id, caption.as_deref(), &badge)
                    .await;
                (results, None)
            }
        };
        let elapsed = started.elapsed();

        let mut deliveries = Vec::with_capacity(recipients.len() + 1);
        let mut unreachable = Vec::new();
        for (recipient, result) in recipients.iter().zip(results) {
            match result {
                Ok(message) => deliveries.push(Delivery::new(*recipient, message)),
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "Delivery failed");
                    if e.is_unreachable() {
                        unreachable.push(*recipient);
                    }
                }
            }
        }
        let delivered = deliveries.len();

        match own_copy {
            Some(Ok(message)) => deliveries.push(Delivery::new(sender.user_id, message)),
            Some(Err(e)) => warn!(error = %e, "Sender reply copy failed"),
            None => {}
        }

        if !deliveries.is_empty() {
            self.remember(sender, origin, &payload, &deliveries).await;
        }

        // Copies are already out; a failed purge must not fail the fan-out
        let directory = DirectoryService::new(self.ctx);
        for recipient in unreachable {
            if let Err(e) = directory.purge(recipient).await {
                warn!(recipient = %recipient, error = %e, "Failed to purge unreachable recipient");
            }
        }

        info!(
            delivered,
            recipients = recipients.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Fan-out complete"
        );

        Ok(DeliveryReport::Delivered {
            channel,
            delivered,
            recipients: recipients.len(),
            elapsed,
            deliveries,
        })
    }

    /// Delete every copy of the fan-out that `(chat, message)` belongs to.
    /// Returns how many copies were removed.
    #[instrument(skip(self))]
    pub async fn delete_fanout(&self, chat: ChatId, message: MessageId) -> ServiceResult<usize> {
        let record = self
            .ctx
            .delivery_log()
            .find_by_copy(chat, message)
            .await?
            .ok_or(DomainError::DeliveryNotFound { chat, message })?;

        let copies = record.all_copies();
        let deletions = copies.iter().map(|copy| {
            self.ctx.messenger().delete_message(DeleteMessage {
                chat: copy.chat,
                message: copy.message,
            })
        });
        let results = join_all(deletions).await;

        let mut deleted = 0;
        for (copy, result) in copies.iter().zip(results) {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => warn!(chat = %copy.chat, message = %copy.message, error = %e, "Failed to delete copy"),
            }
        }

        info!(sender = %record.sender_id, deleted, "Fan-out deleted");
        Ok(deleted)
    }

    async fn fan_out_text(
        &self,
        sender: &UserRecord,
        recipients: &[UserId],
        text: &str,
        reply: Option<&ReplyContext>,
        badge: &Badge,
    ) -> ServiceResult<(Vec<DeliveryResult<MessageId>>, Option<DeliveryResult<MessageId>>)> {
        let body = match reply {
            Some(reply) => {
                let author = self.quote_author(sender.user_id, reply).await?;
                notices::quoted(&author, extract_quoted_text(&reply.text), text)
            }
            None => text.to_string(),
        };

        let messenger = self.ctx.messenger();
        let sends = recipients.iter().map(|recipient| {
            messenger.send_text(SendText::plain(*recipient, body.clone()).badge(badge.clone()))
        });
        let own_copy = async {
            match reply {
                Some(reply) => Some(
                    messenger
                        .send_text(
                            SendText::plain(sender.user_id, text)
                                .reply_to(reply.message_id)
                                .badge(badge.clone()),
                        )
                        .await,
                ),
                None => None,
            }
        };

        Ok(futures::join!(join_all(sends), own_copy))
    }

    async fn fan_out_media(
        &self,
        recipients: &[UserId],
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        badge: &Badge,
    ) -> Vec<DeliveryResult<MessageId>> {
        let messenger = self.ctx.messenger();
        let delay = self.ctx.rate_config().broadcast_delay();
        let caption = caption
            .filter(|_| kind.supports_caption())
            .map(str::to_string);

        let sends = recipients.iter().map(|recipient| {
            let request = SendMedia {
                chat: (*recipient).into(),
                kind,
                file_id: file_id.to_string(),
                caption: caption.clone(),
                badge: Some(badge.clone()),
            };
            async move {
                tokio::time::sleep(delay).await;
                messenger.send_media(request).await
            }
        });
        join_all(sends).await
    }

    /// Author shown in a quote header: the original sender when the replied
    /// message is a relayed copy, otherwise the directory name of the
    /// platform author, otherwise the platform name
    async fn quote_author(&self, reader: UserId, reply: &ReplyContext) -> ServiceResult<String> {
        if let Some(record) = self
            .ctx
            .delivery_log()
            .find_by_copy(reader.into(), reply.message_id)
            .await?
        {
            return Ok(record.sender_display_name);
        }

        if let Some(author) = reply.author_id {
            if let Some(user) = self.ctx.user_repo().find_by_id(author).await? {
                return Ok(user.display_name());
            }
        }

        Ok(reply.author_fallback_name.clone())
    }

    async fn remember(
        &self,
        sender: &UserRecord,
        origin: MessageId,
        payload: &Payload,
        deliveries: &[Delivery],
    ) {
        let record = DeliveryRecord {
            sender_id: sender.user_id,
            sender_display_name: sender.display_name(),
            origin_message: origin,
            deliveries: deliveries.to_vec(),
            message_text: payload.audit_text(),
            timestamp: Utc::now().timestamp(),
        };
        if let Err(e) = self.ctx.delivery_log().append(&record).await {
            error!(error = %e, "Failed to append delivery record");
        }

        self.ctx.reactions().record(
            sender.channel,
            Delivery::new(sender.user_id, origin),
            deliveries.to_vec(),
        );
    }
}

/// Strip nested quote blocks: when `text` already carries one, keep the last
/// line that belongs to neither its header nor its body
pub fn extract_quoted_text(text: &str) -> &str {
    if !text.contains(QUOTE_HEAD) {
        return text;
    }
    text.lines()
        .rev()
        .find(|line| !line.starts_with(QUOTE_HEAD) && !line.starts_with(QUOTE_TAIL))
        .unwrap_or(text)
}
