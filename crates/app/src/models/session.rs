//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use shoptax_core::{Email, IdentityId, Role};

/// An authenticated principal as known to the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub email: Email,
    /// Live flag from the provider; an unverified identity never reaches
    /// role resolution.
    pub email_verified: bool,
}

/// Session-stored resolved user: identity plus role.
///
/// Written only by the session resolution routine after all gates passed;
/// every other component reads it through the auth extractors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: IdentityId,
    pub email: Email,
    pub role: Role,
}

impl CurrentUser {
    /// Landing route for this user's role.
    #[must_use]
    pub const fn home_route(&self) -> &'static str {
        self.role.home_route()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the resolved current user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for a one-shot flash message shown on the next page load.
    pub const FLASH: &str = "flash";
}
