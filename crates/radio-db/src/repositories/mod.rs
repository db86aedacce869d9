//! SQLite repository implementations

mod delivery_log;
mod error;
mod prison;
mod user;

pub use delivery_log::SqliteDeliveryLogRepository;
pub use prison::SqlitePrisonRepository;
pub use user::SqliteUserRepository;
