//! Document-store client.
//!
//! Uploads business photos and challan (payment receipt) images; the store
//! replies with a public URL which is persisted as a plain string field on
//! the business record.

use serde::Deserialize;
use tracing::instrument;

use super::{Backend, BackendError, error_from_response};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Client for the external document store.
#[derive(Clone)]
pub struct StorageClient {
    backend: Backend,
}

impl StorageClient {
    pub(super) fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Upload bytes under `path`, returning the public URL.
    ///
    /// Paths are namespaced by the caller, e.g.
    /// `shops/<identity_id>/<timestamp>_<filename>`.
    ///
    /// # Errors
    ///
    /// Returns an HTTP or API error on transport or server failures.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = format!("{}/{path}", self.backend.storage_url());

        let response = self
            .backend
            .http()
            .post(&url)
            .bearer_auth(self.backend.api_key())
            .header(reqwest::header::CONTENT_TYPE, content_type.to_owned())
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: UploadResponse = response.json().await?;
        Ok(payload.url)
    }
}
