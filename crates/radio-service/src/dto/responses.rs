//! Outcome types returned by the engines

use std::time::Duration;

use radio_core::{ChannelId, Delivery, PrisonEntry, Remaining, UserRecord};

/// Result of `/start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Onboarding {
    pub user: UserRecord,
    /// `true` when the record was created by this call
    pub created: bool,
    /// Members on the user's channel, the user included
    pub population: usize,
}

/// Gate decision for one inbound relay message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    Accepted(UserRecord),
    RateLimited(Duration),
    Imprisoned(Remaining),
    Unregistered,
}

/// What one fan-out achieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    /// Nobody else is on the channel; nothing was sent
    NoRecipients { channel: ChannelId },
    Delivered {
        channel: ChannelId,
        /// Recipients that got their copy
        delivered: usize,
        /// Channel members other than the sender
        recipients: usize,
        elapsed: Duration,
        /// Every copy made, the sender's reply copy included
        deliveries: Vec<Delivery>,
    },
}

impl DeliveryReport {
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::NoRecipients { channel } | Self::Delivered { channel, .. } => *channel,
        }
    }

    pub fn delivered(&self) -> usize {
        match self {
            Self::NoRecipients { .. } => 0,
            Self::Delivered { delivered, .. } => *delivered,
        }
    }
}

/// Result of one rotation fire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    Moved(UserRecord),
    /// Suspended users keep their channel
    Skipped,
    /// The user no longer exists; stop rotating them
    Gone,
}

/// Result of `/zov`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendOutcome {
    pub user: UserRecord,
    pub entry: PrisonEntry,
    /// Reason as typed, `None` when the default was stored
    pub given_reason: Option<String>,
}

/// `"{ms}ms"` below one second, `"{s:.1}s"` from there on
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else {
        format!("{:.1}s", millis as f64 / 1000.0)
    }
}
