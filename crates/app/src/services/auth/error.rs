//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication and session resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password rejected by the identity provider.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity provider is throttling sign-in attempts.
    #[error("too many attempts, try again later")]
    TooManyRequests,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailAlreadyRegistered,

    /// The identity exists but its email is not verified yet.
    #[error("email not verified")]
    EmailUnverified,

    /// No profile document exists for this identity (fatal, fail closed).
    #[error("account not found")]
    AccountNotFound,

    /// The profile's role does not satisfy this deployment's required role.
    #[error("access denied")]
    AccessDenied,

    /// Structurally invalid email address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shoptax_core::EmailError),

    /// Password too short.
    #[error("{0}")]
    WeakPassword(String),

    /// Country code not in the registration table.
    #[error("unknown country code: {0}")]
    UnknownCountry(String),

    /// Profile lookup or another backend call failed; treated as "no role".
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials => Self::InvalidCredentials,
            BackendError::TooManyRequests => Self::TooManyRequests,
            BackendError::EmailExists => Self::EmailAlreadyRegistered,
            other => Self::Backend(other),
        }
    }
}

impl AuthError {
    /// Message safe to show to the user on the failing page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => {
                "Invalid email or password. Please try again.".to_string()
            }
            Self::TooManyRequests => {
                "Too many attempts. Please wait a moment and try again.".to_string()
            }
            Self::EmailAlreadyRegistered => {
                "An account with this email already exists.".to_string()
            }
            Self::EmailUnverified => {
                "Please verify your email address before signing in. Check your inbox for the verification link.".to_string()
            }
            Self::AccountNotFound => "Account not found.".to_string(),
            Self::AccessDenied => "Access denied.".to_string(),
            Self::InvalidEmail(_) => "Invalid email address.".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::UnknownCountry(_) => "Please select your country.".to_string(),
            Self::Backend(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
