//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::Backend;
use crate::config::AppConfig;
use crate::services::auth::AuthService;
use crate::services::geocoding::GeocodingClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    backend: Backend,
    auth: AuthService,
    geocoder: GeocodingClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be constructed.
    pub fn new(config: AppConfig) -> Result<Self, crate::backend::BackendError> {
        let backend = Backend::new(&config.backend)?;
        let auth = AuthService::new(backend.clone(), config.required_role);
        let geocoder = GeocodingClient::new(backend.http().clone(), &config.geocoder);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
                geocoder,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn geocoder(&self) -> &GeocodingClient {
        &self.inner.geocoder
    }
}
