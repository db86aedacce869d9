//! Domain entities - core business objects

mod delivery;
mod payload;
mod prison;
mod user;

pub use delivery::{decode_deliveries, encode_deliveries, Delivery, DeliveryRecord};
pub use payload::{MediaKind, Payload, ReplyContext};
pub use prison::{PrisonEntry, Remaining};
pub use user::UserRecord;
