//! Admin account seeding.
//!
//! # Usage
//!
//! ```bash
//! shoptax-cli seed-admin -e officer@example.gov -n "A. Officer" -p <password> -c PK
//! ```
//!
//! Registration runs against the live identity backend, so the usual rules
//! apply: a verification email is sent and the account cannot sign in until
//! it is confirmed.

use thiserror::Error;

use shoptax_app::config::AppConfig;
use shoptax_app::services::auth::{AuthService, Registration};
use shoptax_app::state::AppState;
use shoptax_core::{Email, Role};

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] shoptax_app::config::ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] shoptax_app::backend::BackendError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Registration failed: {0}")]
    Registration(#[from] shoptax_app::services::auth::AuthError),
}

/// Create an admin (tax officer) account.
pub async fn seed_admin(
    email: &str,
    name: &str,
    password: &str,
    country: &str,
) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let email =
        Email::parse(email).map_err(|e| SeedError::InvalidEmail(e.to_string()))?;

    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;
    let auth: &AuthService = state.auth();

    tracing::info!("Creating admin account: {}", email);

    auth.register(Registration {
        email: email.clone(),
        password: password.to_owned(),
        full_name: name.to_owned(),
        role: Role::Admin,
        country: country.to_owned(),
        city: None,
    })
    .await?;

    tracing::info!("Admin account created for {}", email);
    tracing::info!("A verification email has been sent; the account can sign in once verified.");

    Ok(())
}
