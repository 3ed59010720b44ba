//! ShopTax Core - Shared types library.
//!
//! This crate provides common types used across all ShopTax components:
//! - `app` - Web application (shop-owner and tax-officer surfaces)
//! - `cli` - Operator command-line tools (seeding, config checks)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All durable
//! state lives in an external backend-as-a-service, so these types describe
//! the shapes this system exchanges with it, validated at the boundary.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and emails, geographic coordinates,
//!   and the role/status enums that gate every mutation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
