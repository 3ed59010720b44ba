//! End-to-end login check.
//!
//! # Usage
//!
//! ```bash
//! shoptax-cli check-login -e officer@example.gov -p <password>
//! ```
//!
//! Signs in against the identity backend, feeds the resulting identity
//! through the session resolver, and reports the state it settles on.
//! Useful after seeding an account or changing the required-role setting.

use thiserror::Error;

use shoptax_app::config::AppConfig;
use shoptax_app::services::session::{AuthState, SessionContext, SessionEvent, SessionNotice};
use shoptax_app::state::AppState;
use shoptax_core::Email;

/// Errors that can occur during the login check.
#[derive(Debug, Error)]
pub enum LoginCheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] shoptax_app::config::ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] shoptax_app::backend::BackendError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Session did not resolve: {0}")]
    NotResolved(String),
}

/// Sign in and run the credentials through the session resolver.
pub async fn check_login(email: &str, password: &str) -> Result<(), LoginCheckError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| LoginCheckError::InvalidEmail(e.to_string()))?;

    let config = AppConfig::from_env()?;
    let required_role = config.required_role;
    let state = AppState::new(config)?;

    let signed_in = state.backend().identity().sign_in(&email, password).await?;
    let identity = state.backend().identity().lookup(&signed_in.tokens).await?;

    let mut ctx = SessionContext::attach(state.auth().clone(), state.auth().clone(), required_role);
    if let Some(events) = ctx.events() {
        events
            .send(SessionEvent::SignedIn(identity))
            .await
            .map_err(|e| LoginCheckError::NotResolved(e.to_string()))?;
    }

    let settled = ctx.settled().await;
    match &settled {
        AuthState::Resolved(user) => {
            tracing::info!(role = %user.role, home = user.home_route(), "session resolved");
        }
        AuthState::Unauthenticated => {
            tracing::warn!("session did not resolve; the account was signed out");
        }
        AuthState::Unresolved | AuthState::Resolving(_) => {
            return Err(LoginCheckError::NotResolved("still loading".to_owned()));
        }
    }
    while let Some(notice) = ctx.try_notice() {
        match notice {
            SessionNotice::EmailUnverified => tracing::warn!("email is not verified"),
            SessionNotice::AccountNotFound => tracing::warn!("no profile exists for the account"),
            SessionNotice::AccessDenied => tracing::warn!("role does not match the deployment"),
            SessionNotice::LookupFailed => tracing::warn!("profile lookup failed"),
            SessionNotice::RedirectTo(route) => tracing::info!(route, "would land on"),
        }
    }
    ctx.detach();

    match settled {
        AuthState::Resolved(_) => Ok(()),
        _ => Err(LoginCheckError::NotResolved(
            "credentials were accepted but the session was denied".to_owned(),
        )),
    }
}
