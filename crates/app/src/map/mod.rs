//! Server-side view model for the interactive shop map.
//!
//! The browser side is a thin bootstrap script; everything the script
//! needs (tiles, center, markers, selection) is computed here and
//! embedded in the page as JSON.

pub mod geolocate;
pub mod view;

use shoptax_core::LatLng;

/// Fallback map center (Pakistan centroid) before any data loads.
pub const DEFAULT_CENTER: LatLng = LatLng::from_degrees(30.3753, 69.3451);

pub use geolocate::{GeolocateError, LocateOutcome, PositionProvider, locate};
pub use view::{MapBootstrap, MapMarker, MapView, MarkerColor};
