//! Admin dashboard and shop administration routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use shoptax_core::{LatLng, TaxStatus};

use crate::backend::collections;
use crate::error::{AppError, Result};
use crate::filters;
use crate::map::{DEFAULT_CENTER, MapBootstrap, MapView};
use crate::middleware::RequireAdmin;
use crate::models::{Business, CurrentUser, NewBusiness, decode_document};
use crate::routes::auth::MessageQuery;
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub user: CurrentUser,
    pub shops: Vec<Business>,
    pub total: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub map: Option<MapBootstrap>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Admin shop detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/shop_detail.html")]
pub struct AdminShopDetailTemplate {
    pub user: CurrentUser,
    pub shop: Business,
    pub map: Option<MapBootstrap>,
}

/// Admin shop registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/register.html")]
pub struct AdminRegisterTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub map: Option<MapBootstrap>,
}

async fn load_all_shops(state: &AppState) -> Result<Vec<Business>> {
    let docs = state
        .backend()
        .records()
        .list(collections::BUSINESSES)
        .await?;
    let shops = docs
        .into_iter()
        .map(|doc| decode_document::<Business>(collections::BUSINESSES, doc))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(shops)
}

async fn load_shop(state: &AppState, id: &str) -> Result<Business> {
    let doc = state
        .backend()
        .records()
        .point_read(collections::BUSINESSES, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {id}")))?;
    Ok(decode_document(collections::BUSINESSES, doc)?)
}

/// Admin dashboard: totals, the full map, and the shop table.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<AdminDashboardTemplate> {
    let shops = load_all_shops(&state).await?;

    let total = shops.len();
    let paid = shops
        .iter()
        .filter(|s| s.tax_status == TaxStatus::Paid)
        .count();
    let unpaid = total - paid;

    let config = state.config();
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        DEFAULT_CENTER,
    )
    .with_zoom(5);
    map.mount();
    map.set_shops(shops.clone());

    Ok(AdminDashboardTemplate {
        user,
        shops,
        total,
        paid,
        unpaid,
        map: map.bootstrap(),
        error: query.error,
        success: query.success,
    })
}

/// Admin shop detail.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<AdminShopDetailTemplate> {
    let shop = load_shop(&state, &id).await?;

    let config = state.config();
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        shop.location,
    )
    .with_zoom(15);
    map.mount();
    map.set_shops(vec![shop.clone()]);

    Ok(AdminShopDetailTemplate {
        user,
        shop,
        map: map.bootstrap(),
    })
}

/// Tax-status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: TaxStatus,
}

/// Mark a shop's taxes paid or unpaid.
///
/// Writes `updated_at` alongside the status so the audit trail shows when
/// the decision was made.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    // 404 before write: a typo'd id must not create a partial document.
    let shop = load_shop(&state, &id).await?;

    state
        .backend()
        .records()
        .update(
            collections::BUSINESSES,
            &id,
            &json!({
                "tax_status": form.status,
                "updated_at": Utc::now(),
            }),
        )
        .await?;
    tracing::info!(
        business_id = %id,
        shop_name = %shop.shop_name,
        status = %form.status.label(),
        admin = %user.id,
        "tax status updated"
    );

    Ok(Redirect::to("/admin?success=status_updated").into_response())
}

/// Delete a shop record.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let shop = load_shop(&state, &id).await?;

    state
        .backend()
        .records()
        .delete(collections::BUSINESSES, &id)
        .await?;
    tracing::info!(
        business_id = %id,
        shop_name = %shop.shop_name,
        admin = %user.id,
        "shop deleted"
    );

    Ok(Redirect::to("/admin?success=deleted").into_response())
}

/// Display the on-behalf registration form.
pub async fn register_page(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> AdminRegisterTemplate {
    let config = state.config();
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        DEFAULT_CENTER,
    )
    .selection_mode()
    .with_current_location();
    map.mount();

    AdminRegisterTemplate {
        user,
        error: query.error,
        map: map.bootstrap(),
    }
}

/// Collected fields of the on-behalf registration form.
#[derive(Debug, Default)]
struct AdminShopForm {
    shop_name: String,
    owner_name: String,
    owner_identity_id: String,
    contact_number: String,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    challan_amount: Option<f64>,
    challan_amount_raw: String,
    image: Option<(String, Vec<u8>, String)>,
    challan_image: Option<(String, Vec<u8>, String)>,
}

async fn read_admin_form(multipart: &mut Multipart) -> Result<AdminShopForm> {
    let mut form = AdminShopForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "image" | "challan_image" => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if bytes.is_empty() {
                    continue;
                }
                let slot = (file_name, bytes.to_vec(), content_type);
                if name == "image" {
                    form.image = Some(slot);
                } else {
                    form.challan_image = Some(slot);
                }
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match other {
                    "shop_name" => form.shop_name = value.trim().to_owned(),
                    "owner_name" => form.owner_name = value.trim().to_owned(),
                    "owner_identity_id" => form.owner_identity_id = value.trim().to_owned(),
                    "contact_number" => form.contact_number = value.trim().to_owned(),
                    "address" => form.address = value.trim().to_owned(),
                    "lat" => form.lat = value.parse().ok(),
                    "lng" => form.lng = value.parse().ok(),
                    "challan_amount" => {
                        form.challan_amount_raw = value.trim().to_owned();
                        form.challan_amount = form.challan_amount_raw.parse().ok();
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

fn validate_admin(form: &AdminShopForm) -> std::result::Result<LatLng, &'static str> {
    if form.shop_name.is_empty()
        || form.owner_name.is_empty()
        || form.owner_identity_id.is_empty()
        || form.contact_number.is_empty()
        || form.address.is_empty()
    {
        return Err("missing_fields");
    }
    // An entered but unparsable amount is a typo, not an omission.
    if !form.challan_amount_raw.is_empty() && form.challan_amount.is_none() {
        return Err("bad_amount");
    }
    let (Some(lat), Some(lng)) = (form.lat, form.lng) else {
        return Err("no_location");
    };
    LatLng::new(lat, lng).map_err(|_| "bad_location")
}

/// Handle on-behalf shop registration with optional challan details.
pub async fn register(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Response> {
    let form = read_admin_form(&mut multipart).await?;
    let location = match validate_admin(&form) {
        Ok(location) => location,
        Err(code) => {
            return Ok(Redirect::to(&format!("/admin/register?error={code}")).into_response());
        }
    };

    let storage = state.backend().storage();
    let now_millis = Utc::now().timestamp_millis();

    let image_url = match form.image {
        Some((file_name, bytes, content_type)) => {
            let path = format!("shops/{}/{now_millis}_{file_name}", form.owner_identity_id);
            Some(storage.upload(&path, bytes, &content_type).await?)
        }
        None => None,
    };
    let challan_image_url = match form.challan_image {
        Some((file_name, bytes, content_type)) => {
            let path = format!(
                "challans/{}/{now_millis}_{file_name}",
                form.owner_identity_id
            );
            Some(storage.upload(&path, bytes, &content_type).await?)
        }
        None => None,
    };

    let new_business = NewBusiness {
        shop_name: form.shop_name,
        owner_name: form.owner_name,
        contact_number: form.contact_number,
        address: form.address,
        location,
        image_url,
        challan_amount: form.challan_amount,
        challan_image_url,
        owning_identity_id: form.owner_identity_id.into(),
        registered_by: Some(admin.id.clone()),
    };

    let id = state
        .backend()
        .records()
        .create(collections::BUSINESSES, &new_business.into_fields(Utc::now()))
        .await?;
    tracing::info!(business_id = %id, admin = %admin.id, "shop registered on behalf of owner");

    Ok(Redirect::to("/admin?success=registered").into_response())
}
