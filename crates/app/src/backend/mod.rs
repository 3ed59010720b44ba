//! Backend-as-a-service clients.
//!
//! All durable state lives behind an external HTTPS/REST backend: the
//! identity provider (sign-up, sign-in, verification), the record store
//! (schemaless JSON documents), and the document store (file uploads).
//! The backend is the source of truth - no local sync, direct API calls.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared across the three facades
//! - Schemaless documents are decoded into explicit structs at the model
//!   boundary; unknown shapes are rejected, not trusted
//! - Every suspend point has a paired failure branch; a backend failure is
//!   never fatal to the process

mod identity;
mod records;
mod storage;

pub use identity::{IdentityClient, IdentityTokens, SignInResponse};
pub use records::{RecordStore, collections};
pub use storage::StorageClient;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::BackendConfig;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credentials were rejected by the identity provider.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity provider is throttling this client.
    #[error("too many attempts, try again later")]
    TooManyRequests,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailExists,

    /// A document did not match the expected shape.
    #[error("malformed document in {collection}: {detail}")]
    MalformedDocument {
        collection: &'static str,
        detail: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shared backend connection: one HTTP client, one API key.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    client: reqwest::Client,
    api_url: String,
    storage_url: String,
    api_key: SecretString,
}

impl Backend {
    /// Create the shared backend connection.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shoptax/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendInner {
                client,
                api_url: config.api_url.clone(),
                storage_url: config.storage_url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Identity-provider facade.
    #[must_use]
    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(self.clone())
    }

    /// Record-store facade.
    #[must_use]
    pub fn records(&self) -> RecordStore {
        RecordStore::new(self.clone())
    }

    /// Document-store facade.
    #[must_use]
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(self.clone())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    pub(crate) fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    pub(crate) fn storage_url(&self) -> &str {
        &self.inner.storage_url
    }

    pub(crate) fn api_key(&self) -> &str {
        self.inner.api_key.expose_secret()
    }
}

/// Map a non-success backend response to a `BackendError`.
///
/// Recognizes the identity-provider error codes that have dedicated
/// user-facing handling; everything else becomes a generic API error.
pub(crate) async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();

    if message.contains("INVALID_LOGIN_CREDENTIALS") || message.contains("INVALID_PASSWORD") {
        return BackendError::InvalidCredentials;
    }
    if message.contains("TOO_MANY_ATTEMPTS") || status == 429 {
        return BackendError::TooManyRequests;
    }
    if message.contains("EMAIL_EXISTS") {
        return BackendError::EmailExists;
    }

    BackendError::Api { status, message }
}
