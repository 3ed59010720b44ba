//! Core types for ShopTax.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod latlng;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use latlng::{LatLng, LatLngError};
pub use status::*;
