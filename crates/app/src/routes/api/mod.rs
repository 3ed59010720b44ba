//! JSON/fragment API endpoints backing the interactive widgets.

pub mod geocode;
pub mod geolocate;
