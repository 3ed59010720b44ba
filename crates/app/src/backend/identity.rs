//! Identity-provider client.
//!
//! Consumed as an opaque capability set: sign-up, sign-in, token lookup,
//! sign-out, send-verification-email. The provider owns the user store and
//! the `email_verified` flag; this client never caches either.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use shoptax_core::{Email, IdentityId};

use super::{Backend, BackendError, error_from_response};
use crate::models::Identity;

/// Tokens returned by a successful sign-in or sign-up.
///
/// Held only for the duration of the request that obtained them; the
/// session cookie stores the resolved identity, never the tokens.
#[derive(Debug, Clone)]
pub struct IdentityTokens {
    /// Short-lived bearer token for follow-up identity calls.
    pub id_token: SecretString,
}

/// A successful sign-in: the identity plus its tokens.
#[derive(Debug, Clone)]
pub struct SignInResponse {
    pub identity: Identity,
    pub tokens: IdentityTokens,
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupPayload {
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
    #[serde(rename = "emailVerified", default)]
    email_verified: bool,
}

/// Client for the external identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    backend: Backend,
}

impl IdentityClient {
    pub(super) fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.backend.api_url(),
            action,
            self.backend.api_key()
        )
    }

    /// Create a new identity with email and password.
    ///
    /// The new identity starts unverified; callers are expected to follow
    /// up with [`Self::send_verification_email`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::EmailExists`] if the email is taken, or an
    /// HTTP/API error otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<SignInResponse, BackendError> {
        self.credential_call("signUp", email, password).await
    }

    /// Sign in with email and password.
    ///
    /// Returns the identity with its live `email_verified` flag (a second
    /// lookup round-trip, because the sign-in payload does not carry it).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidCredentials`] for a wrong email or
    /// password and [`BackendError::TooManyRequests`] when throttled.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<SignInResponse, BackendError> {
        let mut signed_in = self
            .credential_call("signInWithPassword", email, password)
            .await?;
        let looked_up = self.lookup(&signed_in.tokens).await?;
        signed_in.identity.email_verified = looked_up.email_verified;
        Ok(signed_in)
    }

    /// Fetch the current state of the identity behind a token.
    ///
    /// # Errors
    ///
    /// Returns an API error if the token is expired or revoked.
    #[instrument(skip_all)]
    pub async fn lookup(&self, tokens: &IdentityTokens) -> Result<Identity, BackendError> {
        let response = self
            .backend
            .http()
            .post(self.endpoint("lookup"))
            .json(&json!({ "idToken": tokens.id_token.expose_secret() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: LookupPayload = response.json().await?;
        let user = payload
            .users
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Api {
                status: 200,
                message: "lookup returned no users".to_string(),
            })?;

        Ok(Identity {
            id: IdentityId::new(user.local_id),
            email: Email::parse(&user.email).map_err(|e| BackendError::MalformedDocument {
                collection: "accounts",
                detail: e.to_string(),
            })?,
            email_verified: user.email_verified,
        })
    }

    /// Ask the provider to email a verification link to the identity.
    ///
    /// # Errors
    ///
    /// Returns an API error if the provider rejects the request (for
    /// example when throttled).
    #[instrument(skip_all)]
    pub async fn send_verification_email(
        &self,
        tokens: &IdentityTokens,
    ) -> Result<(), BackendError> {
        let response = self
            .backend
            .http()
            .post(self.endpoint("sendOobCode"))
            .json(&json!({
                "requestType": "VERIFY_EMAIL",
                "idToken": tokens.id_token.expose_secret(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    /// Revoke the token's session server-side.
    ///
    /// Used when the resolver forces a sign-out (unverified email, missing
    /// profile, role mismatch). Best-effort: local state is cleared even if
    /// revocation fails, so the error only matters for logging.
    ///
    /// # Errors
    ///
    /// Returns an API error if revocation fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, tokens: &IdentityTokens) -> Result<(), BackendError> {
        let response = self
            .backend
            .http()
            .post(self.endpoint("signOut"))
            .json(&json!({ "idToken": tokens.id_token.expose_secret() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn credential_call(
        &self,
        action: &str,
        email: &Email,
        password: &str,
    ) -> Result<SignInResponse, BackendError> {
        let response = self
            .backend
            .http()
            .post(self.endpoint(action))
            .json(&json!({
                "email": email.as_str(),
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: AuthPayload = response.json().await?;
        let email = Email::parse(&payload.email).map_err(|e| BackendError::MalformedDocument {
            collection: "accounts",
            detail: e.to_string(),
        })?;

        Ok(SignInResponse {
            identity: Identity {
                id: IdentityId::new(payload.local_id),
                email,
                // Not reported by credential calls; resolved via lookup.
                email_verified: false,
            },
            tokens: IdentityTokens {
                id_token: SecretString::from(payload.id_token),
            },
        })
    }
}
