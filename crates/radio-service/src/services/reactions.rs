//! Reaction propagation
//!
//! Every fan-out leaves an entry in the [`ReactionMap`] of its channel. When a
//! listener reacts to any copy, the same emoji is set on all the other copies.

use std::collections::VecDeque;

use dashmap::DashMap;
use futures::future::join_all;
use radio_core::{ChannelId, ChatId, Delivery, MessageId, SetReaction, UserId};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Fan-outs remembered per channel before the oldest are evicted
pub const REACTION_MAP_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
struct FanoutEntry {
    origin: Delivery,
    copies: Vec<Delivery>,
}

impl FanoutEntry {
    fn contains(&self, chat: ChatId, message: MessageId) -> bool {
        let asked = Delivery::new(chat, message);
        self.origin == asked || self.copies.contains(&asked)
    }
}

/// In-memory `channel -> origin -> copies` index, bounded per channel
#[derive(Debug)]
pub struct ReactionMap {
    capacity: usize,
    channels: DashMap<ChannelId, VecDeque<FanoutEntry>>,
}

impl ReactionMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: DashMap::new(),
        }
    }

    /// Remember one fan-out, evicting the oldest when the channel is full
    pub fn record(&self, channel: ChannelId, origin: Delivery, copies: Vec<Delivery>) {
        let mut entries = self.channels.entry(channel).or_default();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(FanoutEntry { origin, copies });
    }

    /// Every other copy of the fan-out containing `(chat, message)`
    pub fn siblings(
        &self,
        channel: ChannelId,
        chat: ChatId,
        message: MessageId,
    ) -> Option<Vec<Delivery>> {
        let entries = self.channels.get(&channel)?;
        let entry = entries.iter().rev().find(|e| e.contains(chat, message))?;
        let asked = Delivery::new(chat, message);
        Some(
            std::iter::once(entry.origin)
                .chain(entry.copies.iter().copied())
                .filter(|d| *d != asked)
                .collect(),
        )
    }

    /// Number of fan-outs remembered for a channel
    pub fn len(&self, channel: ChannelId) -> usize {
        self.channels.get(&channel).map_or(0, |e| e.len())
    }
}

impl Default for ReactionMap {
    fn default() -> Self {
        Self::new(REACTION_MAP_CAPACITY)
    }
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mirror a reaction onto the other copies. Returns how many were set.
    #[instrument(skip(self))]
    pub async fn propagate(
        &self,
        reactor: UserId,
        chat: ChatId,
        message: MessageId,
        emoji: String,
    ) -> ServiceResult<usize> {
        let Some(user) = self.ctx.user_repo().find_by_id(reactor).await? else {
            return Ok(0);
        };
        let Some(targets) = self.ctx.reactions().siblings(user.channel, chat, message) else {
            debug!(channel = %user.channel, "Reaction on an unknown message");
            return Ok(0);
        };

        let sends = targets.iter().map(|target| {
            self.ctx.messenger().set_reaction(SetReaction {
                chat: target.chat,
                message: target.message,
                emoji: emoji.clone(),
            })
        });
        let results = join_all(sends).await;

        let mut applied = 0;
        for (target, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => applied += 1,
                Err(e) => warn!(chat = %target.chat, error = %e, "Failed to mirror reaction"),
            }
        }
        Ok(applied)
    }
}
