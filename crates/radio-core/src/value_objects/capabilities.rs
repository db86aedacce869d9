//! Capability flags checked by the command surface before delegating to engines

use bitflags::bitflags;

use super::UserId;

bitflags! {
    /// What a caller is allowed to do
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Send to the current channel and use self-service commands
        const RELAY    = 1 << 0;
        /// Rename, suspend, announce and delete on behalf of others
        const MODERATE = 1 << 1;

        /// Every registered user
        const DEFAULT = Self::RELAY.bits();

        /// The configured owner
        const ALL = Self::RELAY.bits() | Self::MODERATE.bits();
    }
}

impl Capabilities {
    /// Resolve the capability set of a caller
    pub fn for_user(user: UserId, owner: UserId) -> Self {
        if user == owner {
            Self::ALL
        } else {
            Self::DEFAULT
        }
    }

    /// Check if the set grants the required capability
    #[inline]
    pub fn allows(&self, required: Capabilities) -> bool {
        self.contains(required)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::DEFAULT
    }
}
