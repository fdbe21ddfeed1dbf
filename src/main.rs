//! AI Email Assistant Suite - HTTP Server Entry Point
//!
//! Starts the MCP server that exposes the email tools.

use email_assistant::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the variables may come from the real environment.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "email_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, upstream={}",
        config.gemini.model, config.gemini.base_url
    );

    info!(
        "Starting AI Email Assistant Suite on {}:{}",
        config.host, config.port
    );

    api::serve(config).await?;

    Ok(())
}
