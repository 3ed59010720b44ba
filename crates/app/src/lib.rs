//! ShopTax application library.
//!
//! Serves the shop-registration and tax-status site: shop owners register
//! their businesses on a map, admins review them and mark taxes paid or
//! unpaid. Exposed as a library so routes and services can be exercised
//! from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod map;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
