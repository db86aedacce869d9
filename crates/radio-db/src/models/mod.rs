//! Database models
//!
//! Row shapes as stored; conversions to domain entities live in `mappers`.

mod delivery;
mod prison;
mod user;

pub use delivery::StoredMessageModel;
pub use prison::PrisonModel;
pub use user::UserModel;
