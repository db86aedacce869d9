//! Prison entry - a suspended sender

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::UserId;

/// Registry entry for a suspended user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrisonEntry {
    pub user_id: UserId,
    pub reason: String,
    /// Absolute expiry in epoch seconds, `None` = indefinite
    pub until: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Time left on a suspension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Remaining {
    Seconds(u64),
    Infinite,
}

impl PrisonEntry {
    pub fn new(user_id: UserId, reason: String, until: Option<i64>) -> Self {
        Self {
            user_id,
            reason,
            until,
            created_at: Utc::now(),
        }
    }

    /// Remaining time at `now` (epoch seconds), never negative
    pub fn remaining(&self, now: i64) -> Remaining {
        match self.until {
            Some(until) => Remaining::Seconds(until.saturating_sub(now).max(0) as u64),
            None => Remaining::Infinite,
        }
    }

    /// Whether the term ran out. Expired entries stay enforced until released.
    pub fn is_expired(&self, now: i64) -> bool {
        self.until.is_some_and(|until| until <= now)
    }
}

impl Remaining {
    /// Hours and minutes, for moderator summaries
    pub fn hours_minutes(&self) -> Option<(u64, u64)> {
        match self {
            Self::Seconds(secs) => Some((secs / 3600, (secs % 3600) / 60)),
            Self::Infinite => None,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs}"),
            Self::Infinite => f.write_str("∞"),
        }
    }
}
