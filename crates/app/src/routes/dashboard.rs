//! Shop owner dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use shoptax_core::TaxStatus;

use crate::backend::collections;
use crate::error::Result;
use crate::filters;
use crate::map::{DEFAULT_CENTER, MapBootstrap, MapView};
use crate::middleware::RequireShopOwner;
use crate::models::{Business, CurrentUser, decode_document};
use crate::state::AppState;

/// Owner dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    pub shops: Vec<Business>,
    pub unpaid_count: usize,
    pub map: Option<MapBootstrap>,
}

/// Owner dashboard: the owner's shops as a table and a map.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireShopOwner(user): RequireShopOwner,
) -> Result<DashboardTemplate> {
    let docs = state
        .backend()
        .records()
        .query_eq(collections::BUSINESSES, "owning_identity_id", user.id.as_str())
        .await?;
    let shops = docs
        .into_iter()
        .map(|doc| decode_document::<Business>(collections::BUSINESSES, doc))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let unpaid_count = shops
        .iter()
        .filter(|s| s.tax_status == TaxStatus::Unpaid)
        .count();

    // Center on the first shop when there is one, otherwise the default.
    let config = state.config();
    let center = shops.first().map_or(DEFAULT_CENTER, |shop| shop.location);
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        center,
    )
    .with_zoom(if shops.is_empty() { 5 } else { 11 });
    map.mount();
    map.set_shops(shops.clone());

    Ok(DashboardTemplate {
        user,
        shops,
        unpaid_count,
        map: map.bootstrap(),
    })
}
