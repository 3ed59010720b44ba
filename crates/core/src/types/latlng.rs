//! Geographic coordinate pair.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`LatLng`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum LatLngError {
    /// Latitude outside the -90..=90 range.
    #[error("latitude {0} out of range (-90..=90)")]
    LatitudeOutOfRange(f64),
    /// Longitude outside the -180..=180 range.
    #[error("longitude {0} out of range (-180..=180)")]
    LongitudeOutOfRange(f64),
    /// NaN or infinite component.
    #[error("coordinate must be a finite number")]
    NotFinite,
}

/// A geographic coordinate pair.
///
/// Value type: every `Business` carries exactly one, every geocoding
/// candidate produces one. Range-checked at construction so the invariant
/// `-90 <= lat <= 90 && -180 <= lng <= 180` holds everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLatLng")]
pub struct LatLng {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// Wire shape; deserialization funnels through [`LatLng::new`].
#[derive(Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawLatLng> for LatLng {
    type Error = LatLngError;

    fn try_from(raw: RawLatLng) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl LatLng {
    /// Create a validated coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, LatLngError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(LatLngError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LatLngError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(LatLngError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Const constructor for coordinates known at compile time (reference
    /// tables, defaults). A const item built from an out-of-range pair
    /// fails to compile.
    ///
    /// # Panics
    ///
    /// Panics if either component is out of range. NaN fails both
    /// comparisons, so non-finite values panic too.
    #[must_use]
    #[allow(clippy::manual_range_contains)] // `contains` is not const
    pub const fn from_degrees(lat: f64, lng: f64) -> Self {
        assert!(lat >= -90.0 && lat <= 90.0, "latitude out of range");
        assert!(lng >= -180.0 && lng <= 180.0, "longitude out of range");
        Self { lat, lng }
    }

    /// Display form rounded to six decimal places (roughly 0.1 m), the
    /// precision shown everywhere a selected location is read back.
    #[must_use]
    pub fn display_6dp(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_6dp())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        assert!(LatLng::new(24.8607, 67.0011).is_ok());
        assert!(LatLng::new(-90.0, 180.0).is_ok());
        assert!(LatLng::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            LatLng::new(90.01, 0.0),
            Err(LatLngError::LatitudeOutOfRange(90.01))
        );
        assert_eq!(
            LatLng::new(0.0, -180.5),
            Err(LatLngError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_not_finite() {
        assert_eq!(LatLng::new(f64::NAN, 0.0), Err(LatLngError::NotFinite));
        assert_eq!(LatLng::new(0.0, f64::INFINITY), Err(LatLngError::NotFinite));
    }

    #[test]
    fn test_display_six_decimals() {
        let ll = LatLng::new(24.860734551, 67.001136229).unwrap();
        assert_eq!(ll.display_6dp(), "24.860735, 67.001136");
    }

    #[test]
    fn test_deserialize_enforces_range() {
        assert!(serde_json::from_str::<LatLng>(r#"{"lat": 500.0, "lng": -999.0}"#).is_err());
        assert!(serde_json::from_str::<LatLng>(r#"{"lat": -90.5, "lng": 0.0}"#).is_err());
        let ok: LatLng = serde_json::from_str(r#"{"lat": 24.8607, "lng": 67.0011}"#).unwrap();
        assert_eq!(ok, LatLng::new(24.8607, 67.0011).unwrap());
    }

    #[test]
    fn test_const_constructor_matches_checked() {
        const CENTER: LatLng = LatLng::from_degrees(30.3753, 69.3451);
        assert_eq!(CENTER, LatLng::new(30.3753, 69.3451).unwrap());
    }

    #[test]
    fn test_serde_roundtrip_preserves_6dp() {
        let ll = LatLng::new(40.758001, -73.985502).unwrap();
        let json = serde_json::to_string(&ll).unwrap();
        let back: LatLng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.display_6dp(), ll.display_6dp());
    }
}
