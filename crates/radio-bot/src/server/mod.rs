//! Bot setup
//!
//! Wires storage, the Telegram client and the engines together, starts the
//! rotation scheduler and hands over to the polling loop.

mod polling;
mod state;

pub use polling::run_polling;
pub use state::BotState;

use crate::messenger::TelegramMessenger;
use radio_common::{AppConfig, AppError};
use radio_core::NamePolicy;
use radio_service::{RotationScheduler, ServiceContextBuilder};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;

/// Client timeout; longer than the 30 s long-poll so Telegram answers first
const HTTP_TIMEOUT: Duration = Duration::from_secs(45);

/// Telegram client with a timeout suited to long polling
pub fn create_bot(config: &AppConfig) -> Result<Bot, AppError> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
    Ok(Bot::with_client(config.bot.token.expose_secret(), client))
}

/// Initialize all dependencies, start the scheduler and create `BotState`
pub async fn create_bot_state(config: AppConfig) -> Result<BotState, AppError> {
    // Create database pool
    tracing::info!(url = %config.database.url, "Opening SQLite database...");
    let db_config = radio_db::DatabaseConfig::from(&config.database);
    let pool = radio_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    radio_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Schema setup failed: {e}")))?;
    tracing::info!("Database ready");

    // Create repositories
    let user_repo = Arc::new(radio_db::SqliteUserRepository::new(pool.clone()));
    let prison_repo = Arc::new(radio_db::SqlitePrisonRepository::new(pool.clone()));
    let delivery_log = Arc::new(radio_db::SqliteDeliveryLogRepository::new(pool));

    // Create transport
    let bot = create_bot(&config)?;
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));

    // Build service context
    let owner_id = config.bot.owner_id;
    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .prison_repo(prison_repo)
        .delivery_log(delivery_log)
        .messenger(messenger)
        .name_policy(NamePolicy::relaxed(owner_id))
        .channel_config(config.channels.clone())
        .rate_config(config.rate_limit.clone())
        .owner_id(owner_id)
        .build()?;
    let service_context = Arc::new(service_context);

    // Start rotation for everyone already registered
    let (scheduler, rotation) = RotationScheduler::new(Arc::clone(&service_context));
    scheduler.spawn();
    let users = service_context.user_repo().find_all().await?;
    tracing::info!(users = users.len(), "Scheduling rotation for registered users");
    rotation.schedule_all(users.into_iter().map(|user| user.user_id));

    Ok(BotState::new(service_context, bot, rotation, config))
}

/// Run the complete bot with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_bot_state(config).await?;
    let result = run_polling(state.clone()).await;
    state.rotation().shutdown();
    result
}
