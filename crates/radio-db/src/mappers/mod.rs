//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Row` structs: Prepare entity data for binding

mod delivery;
mod prison;
mod user;

pub use delivery::StoredMessageRow;
pub use prison::PrisonRow;
pub use user::UserRow;
