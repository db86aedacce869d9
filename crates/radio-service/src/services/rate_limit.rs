//! Per-user minimum interval between relayed messages
//!
//! The check and the update of a user's timestamp happen under one map-entry
//! lock, so two messages racing from the same user cannot both pass. Above the
//! sweep threshold stale timestamps are dropped at most once per interval.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use radio_core::UserId;
use std::time::{Duration, Instant};

/// Map size above which stale timestamps are dropped on the next check
pub const RATE_LIMIT_SWEEP_THRESHOLD: usize = 10_000;

/// Tracks the last accepted message of every user
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    sweep_threshold: usize,
    last_accepted: DashMap<UserId, Instant>,
    last_sweep: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sweep_threshold: RATE_LIMIT_SWEEP_THRESHOLD,
            last_accepted: DashMap::new(),
            last_sweep: Mutex::new(None),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accept and record `now`, or return how long the user still has to wait
    pub fn check(&self, user: UserId, now: Instant) -> Result<(), Duration> {
        if self.last_accepted.len() > self.sweep_threshold && self.sweep_due(now) {
            self.sweep(now);
        }

        match self.last_accepted.entry(user) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.interval {
                    return Err(self.interval - elapsed);
                }
                entry.insert(now);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Ok(())
            }
        }
    }

    /// Clear the timer of one user
    pub fn forget(&self, user: UserId) {
        self.last_accepted.remove(&user);
    }

    /// Claim the next sweep if a full interval has passed since the last one
    fn sweep_due(&self, now: Instant) -> bool {
        let mut last = self.last_sweep.lock();
        match *last {
            Some(at) if now.saturating_duration_since(at) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Drop timestamps that can no longer reject anything
    pub fn sweep(&self, now: Instant) {
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.saturating_duration_since(*last) < self.interval);
        tracing::debug!(
            removed = before.saturating_sub(self.last_accepted.len()),
            "Swept rate limiter"
        );
    }

    pub fn tracked_users(&self) -> usize {
        self.last_accepted.len()
    }
}

/// Wait time shown to users, rounded to whole seconds
pub fn remaining_secs(wait: Duration) -> u64 {
    wait.as_secs_f64().round() as u64
}
