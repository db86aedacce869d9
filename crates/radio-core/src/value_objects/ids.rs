//! Identifier newtypes
//!
//! Platform identities are plain integers on the wire. Wrapping them keeps a
//! user id from being passed where a channel or message id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error when parsing an identifier from command arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid identifier format")]
    InvalidFormat,
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            #[inline]
            pub const fn new(id: $inner) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<$inner>()
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat)
            }
        }
    };
}

integer_id!(
    /// Platform user identity
    UserId(i64)
);

integer_id!(
    /// Destination chat. Private chats share the id of their user; the
    /// announcement chat is a public channel with its own id.
    ChatId(i64)
);

integer_id!(
    /// Numbered "frequency" a user listens on
    ChannelId(i64)
);

integer_id!(
    /// Platform message id, unique only within one chat
    MessageId(i32)
);

impl From<UserId> for ChatId {
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

impl ChannelId {
    /// Human label used in notifications, e.g. `104 Hz`
    pub fn label(&self) -> String {
        format!("{} Hz", self.0)
    }
}
