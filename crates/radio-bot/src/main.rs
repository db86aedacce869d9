//! Radio relay bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p radio-bot
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use radio_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so the log format can follow APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the bot
    if let Err(e) = run(config).await {
        error!(error = ?e, "Bot stopped with an error");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        channels = %format!("{}..={}", config.channels.min_channel, config.channels.max_channel),
        "Starting radio relay bot..."
    );

    radio_bot::run(config).await?;

    Ok(())
}
