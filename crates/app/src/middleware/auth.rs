//! Authentication middleware and extractors.
//!
//! Role checks live here so handlers only see an already-authorized user.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use shoptax_core::Role;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in, resolved user.
///
/// If nobody is logged in, HTML requests redirect to the login page and
/// `/api/` requests get a bare 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that additionally requires the admin role.
///
/// A signed-in shop owner hitting an admin route is bounced to their own
/// dashboard rather than shown an error page.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that additionally requires the shop-owner role.
pub struct RequireShopOwner(pub CurrentUser);

/// Error returned when a request fails an auth or role gate.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Wrong role; send the user to their own home route.
    WrongRole(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::WrongRole(home) => Redirect::to(home).into_response(),
        }
    }
}

async fn current_user(parts: &mut Parts) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await?;
        if user.role != Role::Admin {
            return Err(AuthRejection::WrongRole(user.home_route()));
        }
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireShopOwner
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await?;
        if user.role != Role::ShopOwner {
            return Err(AuthRejection::WrongRole(user.home_route()));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session after login.
///
/// Rotates the session id first so a cookie issued before login never
/// identifies an authenticated session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// Destroys the whole session record, not just the user key.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    session.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shoptax_core::{Email, IdentityId};
    use tower_sessions::{MemoryStore, SessionStore};

    fn user() -> CurrentUser {
        CurrentUser {
            id: IdentityId::new("u1"),
            email: Email::parse("owner@example.com").unwrap(),
            role: Role::ShopOwner,
        }
    }

    #[tokio::test]
    async fn test_login_rotates_the_session_id() {
        let store = Arc::new(MemoryStore::default());
        let session = Session::new(None, store, None);

        // Anonymous session established before login.
        session.insert("visited", true).await.unwrap();
        session.save().await.unwrap();
        let pre_login = session.id();
        assert!(pre_login.is_some());

        set_current_user(&session, &user()).await.unwrap();
        session.save().await.unwrap();

        assert_ne!(session.id(), pre_login);
    }

    #[tokio::test]
    async fn test_logout_discards_the_session_record() {
        let store = Arc::new(MemoryStore::default());
        let session = Session::new(None, store.clone(), None);

        set_current_user(&session, &user()).await.unwrap();
        session.save().await.unwrap();
        let id = session.id().unwrap();

        clear_current_user(&session).await.unwrap();

        assert!(session.id().is_none());
        assert!(store.load(&id).await.unwrap().is_none());
    }
}
