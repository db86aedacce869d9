//! Test helpers
//!
//! [`TestRelay`] wires a `ServiceContext` to the in-memory fakes and keeps
//! handles on them for assertions.

use std::sync::Arc;

use radio_common::{ChannelConfig, RateLimitConfig};
use radio_core::{ChannelId, UserId, UserRecord, UserRepository};
use radio_service::{ServiceContext, ServiceContextBuilder};

use crate::fakes::{
    InMemoryDeliveryLog, InMemoryPrisonRepository, InMemoryUserRepository, RecordingMessenger,
    SequentialNames,
};
use crate::fixtures::{channel_config, rate_config, OWNER};

/// Engines plus the fakes behind them
pub struct TestRelay {
    pub ctx: Arc<ServiceContext>,
    pub users: Arc<InMemoryUserRepository>,
    pub prison: Arc<InMemoryPrisonRepository>,
    pub log: Arc<InMemoryDeliveryLog>,
    pub messenger: Arc<RecordingMessenger>,
}

impl TestRelay {
    pub fn new() -> Self {
        Self::with_config(channel_config(), rate_config())
    }

    pub fn with_config(channels: ChannelConfig, rates: RateLimitConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let prison = Arc::new(InMemoryPrisonRepository::default());
        let log = Arc::new(InMemoryDeliveryLog::default());
        let messenger = Arc::new(RecordingMessenger::default());

        let ctx = ServiceContextBuilder::new()
            .user_repo(users.clone())
            .prison_repo(prison.clone())
            .delivery_log(log.clone())
            .messenger(messenger.clone())
            .name_generator(Arc::new(SequentialNames::default()))
            .channel_config(channels)
            .rate_config(rates)
            .owner_id(OWNER)
            .rng_seed(7)
            .build()
            .expect("service context");

        Self {
            ctx: Arc::new(ctx),
            users,
            prison,
            log,
            messenger,
        }
    }

    pub fn ctx(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Register `user` directly on `channel`
    pub async fn place(&self, user: UserId, channel: i64) -> UserRecord {
        let record = UserRecord::new(user, ChannelId::new(channel), format!("User {user}"));
        self.users
            .create_if_absent(&record)
            .await
            .expect("create user");
        record
    }

    /// Current record of `user`
    pub async fn user(&self, user: UserId) -> Option<UserRecord> {
        self.users.find_by_id(user).await.expect("find user")
    }
}

impl Default for TestRelay {
    fn default() -> Self {
        Self::new()
    }
}
