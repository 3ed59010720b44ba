//! "Use my location" support.
//!
//! The position fix comes from the browser's geolocation API; the server
//! only classifies the outcome and decides how the view reacts. Error
//! codes follow the W3C Geolocation numbering so the bootstrap script can
//! forward them verbatim.

use std::time::Duration;

use tokio::time::timeout;

use shoptax_core::LatLng;

use super::view::MapView;

/// How long to wait for a position fix.
pub const FIX_TIMEOUT: Duration = Duration::from_secs(10);

/// A cached fix no older than this is acceptable.
pub const MAX_FIX_AGE: Duration = Duration::from_secs(60);

/// Zoom level after recentering on the user.
pub const LOCATE_ZOOM: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocateError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("unknown geolocation failure")]
    Unknown,
}

impl GeolocateError {
    /// Classify a W3C `GeolocationPositionError` code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access was denied. Allow location access and try again."
            }
            Self::PositionUnavailable => "Your location could not be determined.",
            Self::Timeout => "Finding your location took too long. Try again.",
            Self::Unknown => "Something went wrong while finding your location.",
        }
    }
}

/// Source of position fixes. The production impl relays the browser's
/// geolocation API; tests substitute canned fixes and delays.
pub trait PositionProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<LatLng, GeolocateError>> + Send;
}

/// Result of a locate action applied to a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateOutcome {
    pub location: LatLng,
    /// Set when the view is in selection mode and the fix also became
    /// the selected location.
    pub selected: bool,
}

/// Wait for a fix (bounded by [`FIX_TIMEOUT`]), then recenter the view on
/// it at [`LOCATE_ZOOM`]. In selection mode the fix also becomes the
/// selection, so "use my location" fills the registration form in one tap.
pub async fn locate<P: PositionProvider>(
    view: &mut MapView,
    provider: &P,
) -> Result<LocateOutcome, GeolocateError> {
    let fix = match timeout(FIX_TIMEOUT, provider.current_position()).await {
        Ok(result) => result?,
        Err(_elapsed) => return Err(GeolocateError::Timeout),
    };

    view.recenter(fix, LOCATE_ZOOM);
    let selected = view.is_selection_mode() && view.select(fix);
    Ok(LocateOutcome {
        location: fix,
        selected,
    })
}
