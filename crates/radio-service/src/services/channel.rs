//! Channel assignment engine
//!
//! Chooses channels for new, moving and released users and performs one
//! rotation step. Channel membership is never stored separately: it is the
//! set of users whose `channel` field holds the id.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use radio_core::{Badge, ChannelId, DomainError, SendText, UserId, UserRecord};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::directory::DirectoryService;
use super::error::ServiceResult;
use crate::dto::RotationOutcome;
use crate::notices;

/// Upper bound on channels remembered as freshly opened
pub const ACTIVE_REGISTRY_CAP: usize = 1024;

/// Random source and the registry of freshly opened channels
///
/// A channel opened by `random_channel` counts as active for `ttl` even
/// before anyone lands on it; after that only populated channels do.
#[derive(Debug)]
pub struct ChannelRegistry {
    rng: Mutex<StdRng>,
    opened: Mutex<HashMap<ChannelId, Instant>>,
    ttl: Duration,
    cap: usize,
}

impl ChannelRegistry {
    pub fn new(ttl: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            opened: Mutex::new(HashMap::new()),
            ttl,
            cap: ACTIVE_REGISTRY_CAP,
        }
    }

    /// `true` with probability `chance`
    pub fn roll(&self, chance: f64) -> bool {
        self.rng.lock().gen::<f64>() < chance
    }

    /// Uniform id in `[min, max]` other than `reserved`
    pub fn fresh(&self, min: ChannelId, max: ChannelId, reserved: ChannelId) -> ChannelId {
        let (lo, hi) = (min.into_inner(), max.into_inner());
        if lo >= hi {
            return min;
        }
        let reserved = reserved.into_inner();
        let mut rng = self.rng.lock();
        if !(lo..=hi).contains(&reserved) {
            return ChannelId::new(rng.gen_range(lo..=hi));
        }
        // Draw from one fewer slot and step over the reserved id
        let drawn = rng.gen_range(lo..hi);
        ChannelId::new(if drawn >= reserved { drawn + 1 } else { drawn })
    }

    /// Uniform pick among `candidates`
    pub fn choose(&self, candidates: &[ChannelId]) -> Option<ChannelId> {
        candidates.choose(&mut *self.rng.lock()).copied()
    }

    /// Remember a freshly opened channel
    pub fn register(&self, channel: ChannelId) {
        let now = Instant::now();
        let mut opened = self.opened.lock();
        self.prune(&mut opened, now);
        if opened.len() >= self.cap {
            if let Some(oldest) = opened.iter().min_by_key(|(_, at)| **at).map(|(ch, _)| *ch) {
                opened.remove(&oldest);
            }
        }
        opened.insert(channel, now);
    }

    /// Opened channels that have not expired yet
    pub fn opened(&self) -> Vec<ChannelId> {
        let mut opened = self.opened.lock();
        self.prune(&mut opened, Instant::now());
        opened.keys().copied().collect()
    }

    fn prune(&self, opened: &mut HashMap<ChannelId, Instant>, now: Instant) {
        opened.retain(|_, at| now.saturating_duration_since(*at) < self.ttl);
    }
}

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Channel with the fewest members, or now and then a fresh one
    #[instrument(skip(self))]
    pub async fn least_populated_channel(&self) -> ServiceResult<ChannelId> {
        let populations = self.live_populations().await?;
        let Some(&(least, _)) = populations
            .iter()
            .min_by_key(|(channel, count)| (*count, *channel))
        else {
            return Ok(self.fresh_channel());
        };

        if self
            .ctx
            .channels()
            .roll(self.ctx.channel_config().creation_chance)
        {
            return Ok(self.fresh_channel());
        }
        Ok(least)
    }

    /// Random active channel, or now and then a freshly opened one
    #[instrument(skip(self))]
    pub async fn random_channel(&self) -> ServiceResult<ChannelId> {
        let registry = self.ctx.channels();
        if registry.roll(self.ctx.channel_config().creation_chance) {
            let channel = self.fresh_channel();
            registry.register(channel);
            return Ok(channel);
        }

        let mut active: BTreeSet<ChannelId> = self
            .live_populations()
            .await?
            .into_iter()
            .map(|(channel, _)| channel)
            .collect();
        active.extend(registry.opened());
        active.remove(&self.ctx.channel_config().prison());

        let candidates: Vec<ChannelId> = active.into_iter().collect();
        Ok(registry
            .choose(&candidates)
            .unwrap_or_else(|| self.fresh_channel()))
    }

    /// Every channel with members, ascending by id
    #[instrument(skip(self))]
    pub async fn scan(&self) -> ServiceResult<Vec<(ChannelId, u64)>> {
        Ok(self.ctx.user_repo().channel_populations().await?)
    }

    /// Manual move to `channel`
    #[instrument(skip(self))]
    pub async fn goto(&self, user_id: UserId, channel: ChannelId) -> ServiceResult<UserRecord> {
        let config = self.ctx.channel_config();
        if channel == config.prison() {
            return Err(DomainError::ReservedChannel(channel).into());
        }
        if !config.contains(channel) {
            return Err(DomainError::ChannelOutOfRange {
                channel,
                min: config.min(),
                max: config.max(),
            }
            .into());
        }

        let mut user = DirectoryService::new(self.ctx).get(user_id).await?;
        if self.ctx.prison_repo().find(user_id).await?.is_some() {
            return Err(DomainError::Imprisoned.into());
        }

        user.move_to(channel, self.ctx.generate_name());
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, channel = %channel, "User changed channel");
        Ok(user)
    }

    /// One rotation step for `user_id`
    #[instrument(skip(self))]
    pub async fn rotate(&self, user_id: UserId) -> ServiceResult<RotationOutcome> {
        let Some(mut user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            return Ok(RotationOutcome::Gone);
        };
        if self.ctx.prison_repo().find(user_id).await?.is_some() {
            return Ok(RotationOutcome::Skipped);
        }

        let channel = self.random_channel().await?;
        user.move_to(channel, self.ctx.generate_name());
        self.ctx.user_repo().update(&user).await?;

        let display_name = user.display_name();
        let notice = SendText::html(user_id, notices::rotated(channel, &display_name))
            .badge(Badge::name(display_name));
        if let Err(e) = self.ctx.messenger().send_text(notice).await {
            if e.is_unreachable() {
                DirectoryService::new(self.ctx).purge(user_id).await?;
                return Ok(RotationOutcome::Gone);
            }
            warn!(user_id = %user_id, error = %e, "Failed to notify rotated user");
        }

        info!(user_id = %user_id, channel = %channel, "User rotated");
        Ok(RotationOutcome::Moved(user))
    }

    fn fresh_channel(&self) -> ChannelId {
        let config = self.ctx.channel_config();
        self.ctx
            .channels()
            .fresh(config.min(), config.max(), config.prison())
    }

    /// Populations of every channel except the prison
    async fn live_populations(&self) -> ServiceResult<Vec<(ChannelId, u64)>> {
        let prison = self.ctx.channel_config().prison();
        let mut populations = self.ctx.user_repo().channel_populations().await?;
        populations.retain(|(channel, count)| *channel != prison && *count > 0);
        Ok(populations)
    }
}
