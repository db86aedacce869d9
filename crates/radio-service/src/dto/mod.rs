//! Data transfer objects for the command surface
//!
//! This module provides:
//! - Request DTOs with validation for moderator inputs
//! - Outcome types returned by the engines

pub mod requests;
pub mod responses;

pub use requests::{BroadcastRequest, EmojiRequest, NameRequest, VersionAnnouncement};
pub use responses::{
    format_elapsed, DeliveryReport, Intake, Onboarding, RotationOutcome, SuspendOutcome,
};
