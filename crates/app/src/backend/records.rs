//! Record-store client.
//!
//! Schemaless JSON document API: point-read, field-equality query, create,
//! partial update, delete. Documents come back as raw `serde_json::Value`;
//! the model layer decodes them into explicit structs and rejects unknown
//! shapes rather than trusting them.

use serde_json::Value;
use tracing::instrument;

use super::{Backend, BackendError, error_from_response};

/// Collection names used by the application.
pub mod collections {
    /// One profile document per identity, keyed by identity id.
    pub const PROFILES: &str = "profiles";
    /// Registered businesses.
    pub const BUSINESSES: &str = "businesses";
}

/// Client for the external record store.
#[derive(Clone)]
pub struct RecordStore {
    backend: Backend,
}

impl RecordStore {
    pub(super) fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/v1/records/{collection}", self.backend.api_url())
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    /// Point-read a single document by id.
    ///
    /// Returns `None` for a missing document - absence is a normal outcome
    /// (the session resolver treats a missing profile as fatal, but that
    /// policy lives in the resolver, not here).
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self))]
    pub async fn point_read(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        let response = self
            .backend
            .http()
            .get(self.document_url(collection, id))
            .bearer_auth(self.backend.api_key())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Query a collection for documents where `field == value`.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self, value))]
    pub async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, BackendError> {
        let response = self
            .backend
            .http()
            .get(self.collection_url(collection))
            .query(&[(field, value)])
            .bearer_auth(self.backend.api_key())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// List every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self))]
    pub async fn list(&self, collection: &str) -> Result<Vec<Value>, BackendError> {
        let response = self
            .backend
            .http()
            .get(self.collection_url(collection))
            .bearer_auth(self.backend.api_key())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Create a document, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures, or a
    /// malformed-document error if the store's reply lacks an id.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, collection: &str, fields: &Value) -> Result<String, BackendError> {
        let response = self
            .backend
            .http()
            .post(self.collection_url(collection))
            .bearer_auth(self.backend.api_key())
            .json(fields)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = response.json().await?;
        body.get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(BackendError::MalformedDocument {
                collection: "create-response",
                detail: "missing id field".to_string(),
            })
    }

    /// Create a document under a caller-chosen id (used for profiles, which
    /// are keyed by identity id).
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self, fields))]
    pub async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: &Value,
    ) -> Result<(), BackendError> {
        let response = self
            .backend
            .http()
            .put(self.document_url(collection, id))
            .bearer_auth(self.backend.api_key())
            .json(fields)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    /// Apply a partial update to a document.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self, partial))]
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: &Value,
    ) -> Result<(), BackendError> {
        let response = self
            .backend
            .http()
            .patch(self.document_url(collection, id))
            .bearer_auth(self.backend.api_key())
            .json(partial)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let response = self
            .backend
            .http()
            .delete(self.document_url(collection, id))
            .bearer_auth(self.backend.api_key())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}
