//! Value objects - immutable types that represent domain concepts

mod capabilities;
mod ids;
mod prison_term;

pub use capabilities::Capabilities;
pub use ids::{ChannelId, ChatId, IdParseError, MessageId, UserId};
pub use prison_term::{PrisonTerm, DEFAULT_PRISON_REASON};
