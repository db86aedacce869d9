//! Relay engines
//!
//! Each service borrows the shared [`ServiceContext`] and owns one concern:
//! channel assignment, the user directory, fan-out, moderation, reactions,
//! announcements and the rotation timers.

pub mod announce;
pub mod channel;
pub mod context;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod prison;
pub mod rate_limit;
pub mod reactions;
pub mod rotation;

// Re-export all services for convenience
pub use announce::{AnnounceService, DEFAULT_VERSION};
pub use channel::{ChannelRegistry, ChannelService};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use directory::DirectoryService;
pub use dispatcher::{extract_quoted_text, FanoutDispatcher};
pub use error::{ServiceError, ServiceResult};
pub use prison::PrisonService;
pub use rate_limit::{remaining_secs, RateLimiter};
pub use reactions::{ReactionMap, ReactionService};
pub use rotation::{RotationHandle, RotationScheduler};
