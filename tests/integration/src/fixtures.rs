//! Test fixtures and settings
//!
//! Settings keep randomness out of the way: no fresh-channel branch, no
//! broadcast pacing, a short rotation window.

use radio_common::{ChannelConfig, RateLimitConfig};
use radio_core::UserId;

/// Owner of every test relay
pub const OWNER: UserId = UserId::new(1);

/// Reserved prison channel in [`channel_config`]
pub const PRISON: i64 = 0;

pub fn channel_config() -> ChannelConfig {
    ChannelConfig {
        min_channel: 1,
        max_channel: 999,
        prison_channel: PRISON,
        creation_chance: 0.0,
        switch_min_secs: 60,
        switch_max_secs: 120,
    }
}

pub fn rate_config() -> RateLimitConfig {
    RateLimitConfig {
        message_interval_ms: 3000,
        broadcast_delay_ms: 0,
        status_ttl_secs: 0,
    }
}

/// Listener ids start above the owner
pub fn listener(n: i64) -> UserId {
    UserId::new(100 + n)
}
