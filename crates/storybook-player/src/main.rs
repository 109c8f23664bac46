//! Storybook player entry point.

use std::error::Error;

use storybook_player::config::PlayerConfig;
use storybook_player::runner;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting storybook player");

    // Read configuration from environment.
    let config = PlayerConfig::from_env()?;

    runner::play(&config).await?;

    Ok(())
}
