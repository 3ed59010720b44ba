//! Shop registration and detail routes for shop owners.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use shoptax_core::{LatLng, Role};

use crate::backend::collections;
use crate::error::{AppError, Result};
use crate::filters;
use crate::map::{DEFAULT_CENTER, MapBootstrap, MapView};
use crate::middleware::{RequireAuth, RequireShopOwner};
use crate::models::{Business, CurrentUser, NewBusiness, decode_document};
use crate::routes::auth::MessageQuery;
use crate::state::AppState;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Shop registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "shops/register.html")]
pub struct ShopRegisterTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub map: Option<MapBootstrap>,
}

/// Shop detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shops/detail.html")]
pub struct ShopDetailTemplate {
    pub user: CurrentUser,
    pub shop: Business,
    pub map: Option<MapBootstrap>,
}

/// Display the shop registration form with a location-selection map.
pub async fn register_page(
    State(state): State<AppState>,
    RequireShopOwner(user): RequireShopOwner,
    Query(query): Query<MessageQuery>,
) -> ShopRegisterTemplate {
    let config = state.config();
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        DEFAULT_CENTER,
    )
    .selection_mode()
    .with_current_location();
    map.mount();

    ShopRegisterTemplate {
        user,
        error: query.error,
        map: map.bootstrap(),
    }
}

/// Collected and validated fields of the registration form.
#[derive(Debug, Default)]
struct ShopForm {
    shop_name: String,
    owner_name: String,
    contact_number: String,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    image: Option<(String, Vec<u8>, String)>,
}

async fn read_form(multipart: &mut Multipart) -> Result<ShopForm> {
    let mut form = ShopForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "image" => {
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
                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest("image too large".to_string()));
                }
                form.image = Some((file_name, bytes.to_vec(), content_type));
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match other {
                    "shop_name" => form.shop_name = value.trim().to_owned(),
                    "owner_name" => form.owner_name = value.trim().to_owned(),
                    "contact_number" => form.contact_number = value.trim().to_owned(),
                    "address" => form.address = value.trim().to_owned(),
                    "lat" => form.lat = value.parse().ok(),
                    "lng" => form.lng = value.parse().ok(),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

fn validate(form: &ShopForm) -> std::result::Result<LatLng, &'static str> {
    if form.shop_name.is_empty()
        || form.owner_name.is_empty()
        || form.contact_number.is_empty()
        || form.address.is_empty()
    {
        return Err("missing_fields");
    }
    let (Some(lat), Some(lng)) = (form.lat, form.lng) else {
        return Err("no_location");
    };
    LatLng::new(lat, lng).map_err(|_| "bad_location")
}

/// Handle shop registration.
///
/// All validation happens before any network call, so a rejected form never
/// leaves an orphaned upload behind.
pub async fn register(
    State(state): State<AppState>,
    RequireShopOwner(user): RequireShopOwner,
    mut multipart: Multipart,
) -> Result<Response> {
    let form = read_form(&mut multipart).await?;
    let location = match validate(&form) {
        Ok(location) => location,
        Err(code) => {
            return Ok(Redirect::to(&format!("/shops/register?error={code}")).into_response());
        }
    };

    let image_url = match form.image {
        Some((file_name, bytes, content_type)) => {
            let path = format!(
                "shops/{}/{}_{file_name}",
                user.id.as_str(),
                Utc::now().timestamp_millis()
            );
            Some(
                state
                    .backend()
                    .storage()
                    .upload(&path, bytes, &content_type)
                    .await?,
            )
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
        challan_amount: None,
        challan_image_url: None,
        owning_identity_id: user.id.clone(),
        registered_by: None,
    };

    let id = state
        .backend()
        .records()
        .create(collections::BUSINESSES, &new_business.into_fields(Utc::now()))
        .await?;
    tracing::info!(business_id = %id, owner = %user.id, "shop registered");

    Ok(Redirect::to("/dashboard").into_response())
}

/// Shop detail page. Owners see their own shops; admins see any.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ShopDetailTemplate> {
    let doc = state
        .backend()
        .records()
        .point_read(collections::BUSINESSES, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {id}")))?;
    let shop: Business = decode_document(collections::BUSINESSES, doc)?;

    if user.role != Role::Admin && shop.owning_identity_id != user.id {
        return Err(AppError::Forbidden("not your shop".to_string()));
    }

    let config = state.config();
    let mut map = MapView::new(
        config.map.tile_url.clone(),
        config.map.attribution.clone(),
        shop.location,
    )
    .with_zoom(15);
    map.mount();
    map.set_shops(vec![shop.clone()]);

    Ok(ShopDetailTemplate {
        user,
        shop,
        map: map.bootstrap(),
    })
}
