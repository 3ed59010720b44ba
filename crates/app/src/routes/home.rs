//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

use crate::filters;
use crate::middleware::OptionalAuth;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate;

/// Landing page. Signed-in users go straight to their role's home route.
pub async fn home(OptionalAuth(user): OptionalAuth) -> Response {
    match user {
        Some(user) => Redirect::to(user.home_route()).into_response(),
        None => HomeTemplate.into_response(),
    }
}
