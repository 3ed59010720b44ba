//! Authentication route handlers.
//!
//! Login, registration, and logout against the identity backend. Login runs
//! the full resolution pipeline, so a stale or role-mismatched account never
//! gets a session cookie.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use shoptax_core::{Email, Role};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::geo::{COUNTRIES, Country, cities_for};
use crate::services::auth::{AuthError, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: Role,
    pub country: String,
    pub city: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub countries: &'static [Country],
    /// City names per country code, for the dependent city select.
    pub cities_json: String,
}

fn cities_by_country() -> String {
    let mut map = serde_json::Map::new();
    for country in COUNTRIES {
        let cities = cities_for(country.code);
        if !cities.is_empty() {
            map.insert(
                country.code.to_string(),
                serde_json::Value::Array(
                    cities
                        .iter()
                        .map(|c| serde_json::Value::String(c.name.to_string()))
                        .collect(),
                ),
            );
        }
    }
    serde_json::Value::Object(map).to_string()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => return Redirect::to("/auth/login?error=credentials").into_response(),
    };

    match state.auth().login(&email, &form.password).await {
        Ok(user) => {
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }
            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to(user.home_route()).into_response()
        }
        Err(err) => {
            tracing::warn!("Login failed: {}", err);
            let code = match err {
                AuthError::EmailUnverified => "unverified",
                AuthError::AccountNotFound => "no_account",
                AuthError::AccessDenied => "denied",
                AuthError::TooManyRequests => "rate_limited",
                _ => "credentials",
            };
            Redirect::to(&format!("/auth/login?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error,
        countries: COUNTRIES,
        cities_json: cities_by_country(),
    }
}

/// Handle registration form submission.
///
/// Creates the identity and profile, then sends a verification email. The
/// user is not logged in until the email is verified.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }
    if form.full_name.trim().is_empty() {
        return Redirect::to("/auth/register?error=name_required").into_response();
    }

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => return Redirect::to("/auth/register?error=invalid_email").into_response(),
    };

    let city = form.city.filter(|c| !c.is_empty());
    if city.as_deref().is_some_and(|c| {
        !cities_for(&form.country).iter().any(|known| known.name == c)
    }) {
        return Redirect::to("/auth/register?error=unknown_city").into_response();
    }

    let registration = Registration {
        email,
        password: form.password,
        full_name: form.full_name.trim().to_string(),
        role: form.role,
        country: form.country,
        city,
    };

    match state.auth().register(registration).await {
        Ok(()) => {
            Redirect::to("/auth/login?success=check_email").into_response()
        }
        Err(err) => {
            tracing::warn!("Registration failed: {}", err);
            let code = match err {
                AuthError::EmailAlreadyRegistered => "email_taken",
                AuthError::WeakPassword(_) => "password_too_short",
                AuthError::UnknownCountry(_) => "unknown_country",
                _ => "failed",
            };
            Redirect::to(&format!("/auth/register?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/auth/login?success=logged_out").into_response()
}
