//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::naming::NameRejection;
use crate::value_objects::{ChannelId, ChatId, MessageId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User is not in prison: {0}")]
    NotImprisoned(UserId),

    #[error("No delivery record for message {message} in chat {chat}")]
    DeliveryNotFound { chat: ChatId, message: MessageId },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Name rejected: {0}")]
    InvalidName(NameRejection),

    #[error("Channel {channel} outside range {min}..={max}")]
    ChannelOutOfRange {
        channel: ChannelId,
        min: ChannelId,
        max: ChannelId,
    },

    #[error("Channel {0} is reserved")]
    ReservedChannel(ChannelId),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing capability: {0}")]
    MissingCapability(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Sender is in prison")]
    Imprisoned,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get a stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::NotImprisoned(_) => "NOT_IMPRISONED",
            Self::DeliveryNotFound { .. } => "UNKNOWN_DELIVERY",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::ChannelOutOfRange { .. } => "CHANNEL_OUT_OF_RANGE",
            Self::ReservedChannel(_) => "RESERVED_CHANNEL",

            // Authorization
            Self::MissingCapability(_) => "MISSING_CAPABILITY",

            // Business Rules
            Self::Imprisoned => "IMPRISONED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::NotImprisoned(_) | Self::DeliveryNotFound { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidName(_)
                | Self::ChannelOutOfRange { .. }
                | Self::ReservedChannel(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingCapability(_))
    }

    /// Check if this came from infrastructure rather than the caller
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::TransportError(_) | Self::InternalError(_)
        )
    }
}

impl From<NameRejection> for DomainError {
    fn from(rejection: NameRejection) -> Self {
        Self::InvalidName(rejection)
    }
}
