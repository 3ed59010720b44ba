//! Geolocation outcome endpoint.
//!
//! The browser's geolocation API runs client side; this endpoint maps its
//! result onto the view's vocabulary. Successes echo a validated coordinate
//! back, failures are classified by the W3C error code so the page can show
//! a specific message.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shoptax_core::LatLng;

use crate::error::{AppError, Result};
use crate::map::geolocate::{GeolocateError, LOCATE_ZOOM};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Result reported by the browser: either a fix or an error code.
#[derive(Debug, Deserialize)]
pub struct GeolocateReport {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub code: Option<u8>,
}

/// Server's verdict on the reported result.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GeolocateVerdict {
    Located {
        location: LatLng,
        zoom: u8,
    },
    Failed {
        kind: &'static str,
        message: &'static str,
    },
}

/// Classify a browser geolocation result.
pub async fn classify(
    State(_state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(report): Json<GeolocateReport>,
) -> Result<Json<GeolocateVerdict>> {
    if let Some(code) = report.code {
        let err = GeolocateError::from_code(code);
        let kind = match err {
            GeolocateError::PermissionDenied => "permission_denied",
            GeolocateError::PositionUnavailable => "position_unavailable",
            GeolocateError::Timeout => "timeout",
            GeolocateError::Unknown => "unknown",
        };
        return Ok(Json(GeolocateVerdict::Failed {
            kind,
            message: err.user_message(),
        }));
    }

    let (Some(lat), Some(lng)) = (report.lat, report.lng) else {
        return Err(AppError::BadRequest(
            "report carries neither a fix nor an error code".to_string(),
        ));
    };
    let location = LatLng::new(lat, lng)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(GeolocateVerdict::Located {
        location,
        zoom: LOCATE_ZOOM,
    }))
}
