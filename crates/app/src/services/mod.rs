//! Business logic on top of the backend clients.

pub mod auth;
pub mod geocoding;
pub mod session;

pub use auth::{AuthError, AuthService, Registration};
pub use geocoding::{AddressSearch, GeocodeError, GeocodingClient, SearchCandidate, SearchState};
pub use session::{AuthState, SessionContext, SessionEvent, SessionNotice};
