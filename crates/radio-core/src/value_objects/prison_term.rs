//! Suspension term parsed from moderator arguments
//!
//! `30m`, `2h`, `1d` set an absolute expiry. Anything that is not a duration,
//! including a malformed one such as `1.5h`, is read as the start of the reason.

use serde::{Deserialize, Serialize};

/// Reason stored when the moderator gives none
pub const DEFAULT_PRISON_REASON: &str = "Не указана";

/// Parsed `[duration] [reason]` tail of a suspend command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrisonTerm {
    /// Absolute expiry in epoch seconds, `None` = indefinite
    pub until: Option<i64>,
    pub reason: Option<String>,
}

impl PrisonTerm {
    /// Parse the words following the target id
    pub fn parse(args: &[&str], now: i64) -> Self {
        let Some((first, rest)) = args.split_first() else {
            return Self {
                until: None,
                reason: None,
            };
        };

        match parse_duration(first) {
            Some(seconds) => Self {
                until: now.checked_add(seconds),
                reason: join_reason(rest),
            },
            None => Self {
                until: None,
                reason: join_reason(args),
            },
        }
    }

    /// Reason to persist
    pub fn reason_or_default(&self) -> String {
        self.reason
            .clone()
            .unwrap_or_else(|| DEFAULT_PRISON_REASON.to_string())
    }
}

/// Seconds for `<int><m|h|d>`, case-insensitive
fn parse_duration(word: &str) -> Option<i64> {
    let lower = word.to_lowercase();
    let unit = lower.chars().last()?;
    let multiplier = match unit {
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return None,
    };
    let value: i64 = lower[..lower.len() - unit.len_utf8()].parse().ok()?;
    value.checked_mul(multiplier)
}

fn join_reason(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
