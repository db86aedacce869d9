//! # radio-service
//!
//! Application layer containing the relay engines, command parsing, notice
//! templates, and DTOs.

pub mod commands;
pub mod dto;
pub mod notices;
pub mod services;

pub use services::{
    AnnounceService, ChannelService, DirectoryService, FanoutDispatcher, PrisonService,
    ReactionService, RotationHandle, RotationScheduler, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
