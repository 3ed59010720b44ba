//! Authentication service.
//!
//! Owns the sequential session-resolution routine: identity verification
//! gate, profile point-read, role gate. Every path that can publish a role
//! funnels through [`AuthService::resolve`] - the login handler for
//! request/response flows and the stream-driven
//! [`SessionContext`](crate::services::session::SessionContext) for live
//! session events. All gates fail closed: on any ambiguous or erroring
//! condition the identity is signed out and no role is published.

mod error;

pub use error::AuthError;

use chrono::Utc;
use serde_json::json;
use tracing::{instrument, warn};

use shoptax_core::{Email, IdentityId, Role};

use crate::backend::{Backend, IdentityTokens, collections};
use crate::models::{CurrentUser, Identity, Profile, decode_document};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    /// ISO country code; must exist in the country table.
    pub country: String,
    pub city: Option<String>,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    backend: Backend,
    /// When set, sessions resolving to any other role are denied.
    required_role: Option<Role>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: Backend, required_role: Option<Role>) -> Self {
        Self {
            backend,
            required_role,
        }
    }

    /// Register a new account: identity sign-up, profile creation, then a
    /// verification email. The caller lands back on the login page - an
    /// unverified identity cannot resolve a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailAlreadyRegistered`, `WeakPassword`, or a
    /// backend error. Profile-creation failure after sign-up is reported as
    /// a backend error; the next login will then fail closed with
    /// "account not found" rather than guessing a default role.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        validate_password(&registration.password)?;

        let country = crate::models::geo::country_by_code(&registration.country)
            .ok_or_else(|| AuthError::UnknownCountry(registration.country.clone()))?;
        let city = registration.city.as_deref().and_then(|name| {
            crate::models::geo::cities_for(country.code)
                .iter()
                .find(|c| c.name == name)
        });

        let signed_up = self
            .backend
            .identity()
            .sign_up(&registration.email, &registration.password)
            .await?;

        let profile = json!({
            "identity_id": signed_up.identity.id,
            "full_name": registration.full_name,
            "role": registration.role,
            "country": country.code,
            "country_name": country.name,
            "city": city.map(|c| c.name),
            "location": {
                "country": country.latlng(),
                "city": city.map(crate::models::geo::City::latlng),
            },
            "status": "active",
            "created_at": Utc::now(),
        });
        self.backend
            .records()
            .create_with_id(
                collections::PROFILES,
                signed_up.identity.id.as_str(),
                &profile,
            )
            .await?;

        self.backend
            .identity()
            .send_verification_email(&signed_up.tokens)
            .await?;

        Ok(())
    }

    /// Sign in and run the full resolution routine.
    ///
    /// # Errors
    ///
    /// Returns the specific gate failure; in every failure case after
    /// sign-in the identity has already been signed back out.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<CurrentUser, AuthError> {
        let signed_in = self.backend.identity().sign_in(email, password).await?;
        self.resolve(&signed_in.identity, Some(&signed_in.tokens))
            .await
    }

    /// The sequential resolution routine (strictly ordered; the profile
    /// fetch completes or fails before any role is published):
    ///
    /// 1. unverified email => force sign-out, report, stop
    /// 2. point-read the profile by identity id
    /// 3. missing profile => fatal: sign out, "account not found"
    /// 4. required-role mismatch => sign out, "access denied"
    /// 5. otherwise the resolved `{identity, role}` pair
    ///
    /// Any error during the lookup is treated as "no role" and forces
    /// sign-out - never a stale or guessed role.
    ///
    /// # Errors
    ///
    /// Returns the specific gate failure.
    #[instrument(skip_all, fields(identity = %identity.id))]
    pub async fn resolve(
        &self,
        identity: &Identity,
        tokens: Option<&IdentityTokens>,
    ) -> Result<CurrentUser, AuthError> {
        if !identity.email_verified {
            self.force_sign_out(tokens).await;
            return Err(AuthError::EmailUnverified);
        }

        let profile = match self.fetch_profile(&identity.id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "profile lookup failed, failing closed");
                self.force_sign_out(tokens).await;
                return Err(err.into());
            }
        };

        let Some(profile) = profile else {
            self.force_sign_out(tokens).await;
            return Err(AuthError::AccountNotFound);
        };

        if let Some(required) = self.required_role {
            if profile.role != required {
                self.force_sign_out(tokens).await;
                return Err(AuthError::AccessDenied);
            }
        }

        Ok(CurrentUser {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: profile.role,
        })
    }

    /// Point-read the profile document for an identity.
    ///
    /// # Errors
    ///
    /// Returns a backend error on transport failure or a malformed document.
    pub async fn fetch_profile(
        &self,
        id: &IdentityId,
    ) -> Result<Option<Profile>, crate::backend::BackendError> {
        let doc = self
            .backend
            .records()
            .point_read(collections::PROFILES, id.as_str())
            .await?;
        doc.map(|doc| decode_document(collections::PROFILES, doc))
            .transpose()
    }

    /// Best-effort provider-side sign-out; local state is cleared by the
    /// caller regardless of the outcome.
    async fn force_sign_out(&self, tokens: Option<&IdentityTokens>) {
        if let Some(tokens) = tokens {
            if let Err(err) = self.backend.identity().sign_out(tokens).await {
                warn!(error = %err, "provider sign-out failed");
            }
        }
    }
}

/// Validate a password against the minimum length requirement.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
