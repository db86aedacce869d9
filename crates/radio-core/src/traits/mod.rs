//! Ports - interfaces the infrastructure layer implements

mod messenger;
mod repositories;

pub use messenger::{
    Badge, BadgeKind, DeleteMessage, DeliveryError, DeliveryResult, EditText, Messenger,
    SendMedia, SendText, SetReaction, TextFormat,
};
pub use repositories::{DeliveryLogRepository, PrisonRepository, RepoResult, UserRepository};
