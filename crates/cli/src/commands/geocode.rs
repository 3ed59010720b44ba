//! Interactive address search.
//!
//! Reads queries line by line from stdin and runs them through the same
//! debounced search driver the web form uses, printing each published
//! state. Useful for checking the geocoder endpoint and country allowlist
//! without starting the server.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use shoptax_app::config::AppConfig;
use shoptax_app::services::geocoding::{AddressSearch, DEBOUNCE, SearchState};
use shoptax_app::state::AppState;

#[derive(Debug, Error)]
pub enum GeocodeCliError {
    #[error("Configuration error: {0}")]
    Config(#[from] shoptax_app::config::ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] shoptax_app::backend::BackendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the interactive search loop until stdin closes.
pub async fn interactive() -> Result<(), GeocodeCliError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;
    let search = AddressSearch::new(state.geocoder().clone());

    tracing::info!("Type an address query and press enter (Ctrl-D to exit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        search.input(line).await;

        // Wait out the debounce window, then for the request to settle.
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        let mut watch = search.watch();
        loop {
            match search.state() {
                SearchState::Loading => {
                    if watch.changed().await.is_err() {
                        break;
                    }
                }
                state => {
                    report(&state);
                    break;
                }
            }
        }
    }

    Ok(())
}

fn report(state: &SearchState) {
    match state {
        SearchState::Idle => tracing::info!("(query too short)"),
        SearchState::Loading => {}
        SearchState::Results(candidates) => {
            for candidate in candidates {
                tracing::info!(
                    "{}  [{}]",
                    candidate.display_name,
                    candidate.location.display_6dp()
                );
            }
        }
        SearchState::NoResults(query) => tracing::info!("No matches for \"{query}\""),
        SearchState::Error => tracing::warn!("Search failed; see logs above"),
    }
}
