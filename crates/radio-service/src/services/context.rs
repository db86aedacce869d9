//! Service context - dependency container for services
//!
//! Holds the repositories, the messenger, and the in-memory state owned by
//! the engines (channel registry, rate limiter, reaction map).

use std::sync::Arc;

use radio_common::{ChannelConfig, RateLimitConfig};
use radio_core::{
    Capabilities, DeliveryLogRepository, Messenger, NameGenerator, NamePolicy, PrisonRepository,
    RandomNameGenerator, UserId, UserRepository,
};

use super::channel::ChannelRegistry;
use super::error::{ServiceError, ServiceResult};
use super::rate_limit::RateLimiter;
use super::reactions::{ReactionMap, REACTION_MAP_CAPACITY};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - The messaging transport
/// - Name generation and validation
/// - Live channel, rate-limit and reaction state
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    prison_repo: Arc<dyn PrisonRepository>,
    delivery_log: Arc<dyn DeliveryLogRepository>,

    // Transport
    messenger: Arc<dyn Messenger>,

    // Names
    name_generator: Arc<dyn NameGenerator>,
    name_policy: Arc<NamePolicy>,

    // Live state
    channels: Arc<ChannelRegistry>,
    rate_limiter: Arc<RateLimiter>,
    reactions: Arc<ReactionMap>,

    // Settings
    channel_config: ChannelConfig,
    rate_config: RateLimitConfig,
    owner_id: UserId,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the prison repository
    pub fn prison_repo(&self) -> &dyn PrisonRepository {
        self.prison_repo.as_ref()
    }

    /// Get the delivery log repository
    pub fn delivery_log(&self) -> &dyn DeliveryLogRepository {
        self.delivery_log.as_ref()
    }

    // === Transport ===

    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    // === Names ===

    pub fn name_generator(&self) -> &dyn NameGenerator {
        self.name_generator.as_ref()
    }

    pub fn name_policy(&self) -> &NamePolicy {
        &self.name_policy
    }

    /// A fresh generated pseudonym
    pub fn generate_name(&self) -> String {
        self.name_generator.generate()
    }

    // === Live State ===

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn reactions(&self) -> &ReactionMap {
        &self.reactions
    }

    // === Settings ===

    pub fn channel_config(&self) -> &ChannelConfig {
        &self.channel_config
    }

    pub fn rate_config(&self) -> &RateLimitConfig {
        &self.rate_config
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Capability set of a caller
    pub fn capabilities(&self, user: UserId) -> Capabilities {
        Capabilities::for_user(user, self.owner_id)
    }

    /// Fail unless `user` holds `required`
    pub fn require(&self, user: UserId, required: Capabilities) -> ServiceResult<()> {
        if self.capabilities(user).allows(required) {
            Ok(())
        } else {
            Err(ServiceError::missing_capability(format!("{required:?}")))
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("messenger", &"dyn Messenger")
            .field("channel_config", &self.channel_config)
            .field("rate_config", &self.rate_config)
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    prison_repo: Option<Arc<dyn PrisonRepository>>,
    delivery_log: Option<Arc<dyn DeliveryLogRepository>>,
    messenger: Option<Arc<dyn Messenger>>,
    name_generator: Option<Arc<dyn NameGenerator>>,
    name_policy: Option<NamePolicy>,
    channel_config: Option<ChannelConfig>,
    rate_config: Option<RateLimitConfig>,
    owner_id: Option<UserId>,
    rng_seed: Option<u64>,
    reaction_capacity: Option<usize>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn prison_repo(mut self, repo: Arc<dyn PrisonRepository>) -> Self {
        self.prison_repo = Some(repo);
        self
    }

    pub fn delivery_log(mut self, repo: Arc<dyn DeliveryLogRepository>) -> Self {
        self.delivery_log = Some(repo);
        self
    }

    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn name_generator(mut self, generator: Arc<dyn NameGenerator>) -> Self {
        self.name_generator = Some(generator);
        self
    }

    pub fn name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = Some(policy);
        self
    }

    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = Some(config);
        self
    }

    pub fn rate_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_config = Some(config);
        self
    }

    pub fn owner_id(mut self, owner: UserId) -> Self {
        self.owner_id = Some(owner);
        self
    }

    /// Seed channel selection, for reproducible tests
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn reaction_capacity(mut self, capacity: usize) -> Self {
        self.reaction_capacity = Some(capacity);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let owner_id = self
            .owner_id
            .ok_or_else(|| ServiceError::validation("owner_id is required"))?;
        let channel_config = self.channel_config.unwrap_or_default();
        let rate_config = self.rate_config.unwrap_or_default();

        let channels = ChannelRegistry::new(
            std::time::Duration::from_secs(channel_config.switch_max_secs),
            self.rng_seed,
        );
        let rate_limiter = RateLimiter::new(rate_config.message_interval());
        let reactions = ReactionMap::new(self.reaction_capacity.unwrap_or(REACTION_MAP_CAPACITY));

        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            prison_repo: self
                .prison_repo
                .ok_or_else(|| ServiceError::validation("prison_repo is required"))?,
            delivery_log: self
                .delivery_log
                .ok_or_else(|| ServiceError::validation("delivery_log is required"))?,
            messenger: self
                .messenger
                .ok_or_else(|| ServiceError::validation("messenger is required"))?,
            name_generator: self
                .name_generator
                .unwrap_or_else(|| Arc::new(RandomNameGenerator)),
            name_policy: Arc::new(
                self.name_policy
                    .unwrap_or_else(|| NamePolicy::relaxed(owner_id)),
            ),
            channels: Arc::new(channels),
            rate_limiter: Arc::new(rate_limiter),
            reactions: Arc::new(reactions),
            channel_config,
            rate_config,
            owner_id,
        })
    }
}
