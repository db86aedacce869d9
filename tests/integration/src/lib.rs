//! Integration test utilities for the radio relay
//!
//! The engines run against in-memory repositories and a messenger that
//! records every outbound call, so no Telegram account or database file is
//! needed.

pub mod fakes;
pub mod fixtures;
pub mod helpers;

pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;
