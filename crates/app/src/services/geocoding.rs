//! Forward geocoding against a Nominatim-compatible endpoint, plus the
//! debounced search driver behind the address-suggestion box.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use shoptax_core::{LatLng, PlaceId};

use crate::config::GeocoderConfig;

/// Queries shorter than this never reach the network.
pub const MIN_QUERY_LEN: usize = 3;

/// Quiet period after the last keystroke before a request is issued.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

const MAX_RESULTS: usize = 5;
const CACHE_CAPACITY: u64 = 256;
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("geocoder returned malformed coordinates: {0}")]
    MalformedCoordinates(String),
}

/// One address suggestion.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchCandidate {
    pub display_name: String,
    pub location: LatLng,
    pub place_id: PlaceId,
}

/// Wire shape of a Nominatim search result. Coordinates arrive as
/// decimal strings, not numbers.
#[derive(Debug, Deserialize)]
struct WireCandidate {
    place_id: u64,
    display_name: String,
    lat: String,
    lon: String,
}

impl WireCandidate {
    fn into_candidate(self) -> Result<SearchCandidate, GeocodeError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| GeocodeError::MalformedCoordinates(self.lat.clone()))?;
        let lng: f64 = self
            .lon
            .parse()
            .map_err(|_| GeocodeError::MalformedCoordinates(self.lon.clone()))?;
        let location = LatLng::new(lat, lng)
            .map_err(|err| GeocodeError::MalformedCoordinates(err.to_string()))?;
        Ok(SearchCandidate {
            display_name: self.display_name,
            location,
            place_id: PlaceId::new(self.place_id.to_string()),
        })
    }
}

/// HTTP client for the geocoding endpoint, with a short-lived cache so
/// repeated identical queries (back-and-forth typing) stay local.
#[derive(Clone)]
pub struct GeocodingClient {
    inner: Arc<GeocodingClientInner>,
}

struct GeocodingClientInner {
    http: reqwest::Client,
    url: String,
    country_codes: String,
    cache: Cache<String, Arc<Vec<SearchCandidate>>>,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &GeocoderConfig) -> Self {
        Self {
            inner: Arc::new(GeocodingClientInner {
                http,
                url: config.url.clone(),
                country_codes: config.country_codes.clone(),
                cache: Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// Search for addresses matching `query`, capped at five candidates
    /// and restricted to the configured country allowlist.
    pub async fn search(&self, query: &str) -> Result<Arc<Vec<SearchCandidate>>, GeocodeError> {
        if let Some(hit) = self.inner.cache.get(query).await {
            debug!(query, "geocode cache hit");
            return Ok(hit);
        }

        let response = self
            .inner
            .http
            .get(&self.inner.url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", &MAX_RESULTS.to_string()),
                ("countrycodes", &self.inner.country_codes),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let wire: Vec<WireCandidate> = response.json().await?;
        let candidates = wire
            .into_iter()
            .map(WireCandidate::into_candidate)
            .collect::<Result<Vec<_>, _>>()?;

        let candidates = Arc::new(candidates);
        self.inner
            .cache
            .insert(query.to_string(), Arc::clone(&candidates))
            .await;
        Ok(candidates)
    }
}

/// Published state of an address search box.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Results(Vec<SearchCandidate>),
    /// The query returned nothing; kept so the UI can word the message.
    NoResults(String),
    Error,
}

/// Search capability behind [`AddressSearch`], so the debounce logic is
/// testable without a network.
pub trait SearchProvider: Clone + Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchCandidate>, GeocodeError>> + Send;
}

impl SearchProvider for GeocodingClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, GeocodeError> {
        Self::search(self, query).await.map(|arc| (*arc).clone())
    }
}

/// Debounced driver for an address search box.
///
/// Every keystroke is pushed through [`input`](Self::input). A request is
/// issued only after [`DEBOUNCE`] of quiet, queries below [`MIN_QUERY_LEN`]
/// clear the state without a request, and each request carries a
/// monotonically increasing sequence number so a stale response can never
/// overwrite a newer one.
pub struct AddressSearch {
    input: mpsc::Sender<String>,
    state: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl AddressSearch {
    #[must_use]
    pub fn new<P: SearchProvider>(provider: P) -> Self {
        let (input_tx, input_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);
        let task = tokio::spawn(drive(provider, input_rx, state_tx));
        Self {
            input: input_tx,
            state: state_rx,
            task,
        }
    }

    /// Push the current text of the search box.
    pub async fn input(&self, query: impl Into<String>) {
        let _ = self.input.send(query.into()).await;
    }

    /// Current published state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Watch receiver for consumers that render on change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }
}

impl Drop for AddressSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive<P: SearchProvider>(
    provider: P,
    mut input: mpsc::Receiver<String>,
    state: watch::Sender<SearchState>,
) {
    let mut sequence: u64 = 0;
    let mut pending: Option<String> = None;

    loop {
        let received = if pending.is_some() {
            // A keystroke is waiting out the debounce window; another
            // keystroke restarts the window, quiet fires the request.
            match tokio::time::timeout(DEBOUNCE, input.recv()).await {
                Ok(received) => received,
                Err(_elapsed) => {
                    if let Some(query) = pending.take() {
                        sequence += 1;
                        let tag = sequence;
                        let _ = state.send(SearchState::Loading);
                        let outcome = provider.search(&query).await;
                        // Keystrokes that arrived during the request have
                        // already bumped nothing (we only read input between
                        // requests), but drain defensively against a stale
                        // publish if the channel raced a newer entry in.
                        if tag == sequence {
                            publish(&state, &query, outcome);
                        }
                    }
                    continue;
                }
            }
        } else {
            input.recv().await
        };

        let Some(query) = received else { break };
        let query = query.trim().to_string();
        if query.len() < MIN_QUERY_LEN {
            pending = None;
            let _ = state.send(SearchState::Idle);
            continue;
        }
        pending = Some(query);
    }
}

fn publish(
    state: &watch::Sender<SearchState>,
    query: &str,
    outcome: Result<Vec<SearchCandidate>, GeocodeError>,
) {
    match outcome {
        Ok(candidates) if candidates.is_empty() => {
            let _ = state.send(SearchState::NoResults(query.to_string()));
        }
        Ok(candidates) => {
            let _ = state.send(SearchState::Results(candidates));
        }
        Err(err) => {
            warn!(query, error = %err, "address search failed");
            let _ = state.send(SearchState::Error);
        }
    }
}
