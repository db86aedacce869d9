//! Bot state
//!
//! Shared dependencies handed to every update handler.

use radio_common::AppConfig;
use radio_service::{RotationHandle, ServiceContext};
use std::sync::Arc;
use teloxide::Bot;

/// Bot application state
///
/// Cheap to clone; each spawned handler gets its own copy.
#[derive(Clone)]
pub struct BotState {
    /// Service context with repositories and live state
    service_context: Arc<ServiceContext>,
    /// Telegram client, for calls outside the `Messenger` port
    bot: Bot,
    /// Rotation scheduler handle
    rotation: RotationHandle,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl BotState {
    /// Create a new bot state
    pub fn new(
        service_context: Arc<ServiceContext>,
        bot: Bot,
        rotation: RotationHandle,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context,
            bot,
            rotation,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn rotation(&self) -> &RotationHandle {
        &self.rotation
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .finish()
    }
}
