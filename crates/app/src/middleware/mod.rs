pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, RequireShopOwner};
pub use session::session_layer;
