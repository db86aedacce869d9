//! # radio-core
//!
//! Domain layer of the radio relay: users, channels, prison entries, delivery
//! records, the repository and transport ports, and display-name validation.
//! This crate has zero dependencies on infrastructure (database, bot framework, etc.).

pub mod entities;
pub mod error;
pub mod naming;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    decode_deliveries, encode_deliveries, Delivery, DeliveryRecord, MediaKind, Payload,
    PrisonEntry, Remaining, ReplyContext, UserRecord,
};
pub use error::DomainError;
pub use naming::{NameGenerator, NamePolicy, NameRejection, RandomNameGenerator, RestrictedName};
pub use traits::{
    Badge, BadgeKind, DeleteMessage, DeliveryError, DeliveryLogRepository, DeliveryResult,
    EditText, Messenger, PrisonRepository, RepoResult, SendMedia, SendText, SetReaction,
    TextFormat, UserRepository,
};
pub use value_objects::{
    Capabilities, ChannelId, ChatId, IdParseError, MessageId, PrisonTerm, UserId,
    DEFAULT_PRISON_REASON,
};
