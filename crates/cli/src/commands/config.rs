//! Configuration check.
//!
//! Loads the full configuration exactly as the server would, so missing
//! variables, placeholder secrets, and low-entropy session keys are caught
//! before a deploy rather than at startup.

use shoptax_app::config::{AppConfig, ConfigError};

/// Load and report the configuration.
pub fn check() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    tracing::info!("Configuration OK");
    tracing::info!("  bind:     {}", config.socket_addr());
    tracing::info!("  base_url: {}", config.base_url);
    tracing::info!("  backend:  {}", config.backend.api_url);
    tracing::info!("  storage:  {}", config.backend.storage_url);
    tracing::info!("  geocoder: {}", config.geocoder.url);
    tracing::info!("  tiles:    {}", config.map.tile_url);
    match &config.required_role {
        Some(role) => tracing::info!("  role:     restricted to {role}"),
        None => tracing::info!("  role:     both roles served"),
    }
    match &config.sentry_dsn {
        Some(_) => tracing::info!("  sentry:   enabled"),
        None => tracing::info!("  sentry:   disabled"),
    }

    Ok(())
}
