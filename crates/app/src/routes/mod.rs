//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (redirects signed-in users home)
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Shop owner (requires shop_owner role)
//! GET  /dashboard              - Owner dashboard (own shops, map)
//! GET  /shops/register         - Shop registration form
//! POST /shops/register         - Shop registration action (multipart)
//! GET  /shops/{id}             - Shop detail (owner or admin)
//!
//! # Admin (requires admin role)
//! GET  /admin                  - Admin dashboard (stats, map, table)
//! GET  /admin/register         - Register a shop on an owner's behalf
//! POST /admin/register         - Register action (multipart, challan fields)
//! GET  /admin/shops/{id}       - Admin shop detail
//! POST /admin/shops/{id}/status - Mark tax paid/unpaid
//! POST /admin/shops/{id}/delete - Delete a shop record
//!
//! # API (HTMX fragments / JSON)
//! GET  /api/geocode            - Address suggestions fragment
//! POST /api/geolocate          - Classify a browser geolocation result
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod shops;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(shops::register_page).post(shops::register),
        )
        .route("/{id}", get(shops::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route(
            "/register",
            get(admin::register_page).post(admin::register),
        )
        .route("/shops/{id}", get(admin::show))
        .route("/shops/{id}/status", post(admin::set_status))
        .route("/shops/{id}/delete", post(admin::delete))
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/geocode", get(api::geocode::suggest))
        .route("/geolocate", post(api::geolocate::classify))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/dashboard", get(dashboard::dashboard))
        .nest("/shops", shop_routes())
        .nest("/admin", admin_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
