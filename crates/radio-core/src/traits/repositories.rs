//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{DeliveryRecord, PrisonEntry, UserRecord};
use crate::error::DomainError;
use crate::value_objects::{ChannelId, ChatId, MessageId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<UserRecord>>;

    /// All registered users, oldest first
    async fn find_all(&self) -> RepoResult<Vec<UserRecord>>;

    /// Members of one channel
    async fn find_by_channel(&self, channel: ChannelId) -> RepoResult<Vec<UserRecord>>;

    /// Member count per channel, ascending by channel id
    async fn channel_populations(&self) -> RepoResult<Vec<(ChannelId, u64)>>;

    /// Insert unless a record with the same id exists.
    /// Returns `true` when the row was inserted.
    async fn create_if_absent(&self, user: &UserRecord) -> RepoResult<bool>;

    /// Persist channel, names and emoji
    async fn update(&self, user: &UserRecord) -> RepoResult<()>;

    /// Hard delete, returns whether a row existed
    async fn delete(&self, id: UserId) -> RepoResult<bool>;
}

// ============================================================================
// Prison Repository
// ============================================================================

#[async_trait]
pub trait PrisonRepository: Send + Sync {
    /// Find the entry of a user
    async fn find(&self, user: UserId) -> RepoResult<Option<PrisonEntry>>;

    /// Create or replace the entry of `entry.user_id`
    async fn upsert(&self, entry: &PrisonEntry) -> RepoResult<()>;

    /// Remove the entry, returns whether one existed
    async fn delete(&self, user: UserId) -> RepoResult<bool>;

    /// Every entry, expired ones included
    async fn find_all(&self) -> RepoResult<Vec<PrisonEntry>>;
}

// ============================================================================
// Delivery Log Repository
// ============================================================================

#[async_trait]
pub trait DeliveryLogRepository: Send + Sync {
    /// Append a record, returns its row id
    async fn append(&self, record: &DeliveryRecord) -> RepoResult<i64>;

    /// Most recent record whose origin or copies include `(chat, message)`
    async fn find_by_copy(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> RepoResult<Option<DeliveryRecord>>;
}
