//! Address-suggestion endpoint.
//!
//! Backs the search box on the shop registration pages. The client side
//! debounces keystrokes; this handler re-applies the minimum-length gate so
//! a misbehaving client still cannot spam the geocoder with one-letter
//! queries.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::geocoding::{MIN_QUERY_LEN, SearchCandidate};
use crate::state::AppState;

/// Query parameters for the suggestion endpoint.
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: Option<String>,
}

/// Suggestion list fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/geocode_results.html")]
pub struct GeocodeResultsTemplate {
    pub query: String,
    pub candidates: Vec<SearchCandidate>,
}

/// Return address suggestions for the given query as an HTML fragment.
pub async fn suggest(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<GeocodeQuery>,
) -> Result<GeocodeResultsTemplate> {
    let query = params.q.unwrap_or_default().trim().to_owned();
    if query.len() < MIN_QUERY_LEN {
        // Too short to search; render nothing rather than "no matches".
        return Ok(GeocodeResultsTemplate {
            query: String::new(),
            candidates: Vec::new(),
        });
    }

    let candidates = state.geocoder().search(&query).await?;
    Ok(GeocodeResultsTemplate {
        query,
        candidates: (*candidates).clone(),
    })
}
