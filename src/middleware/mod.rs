mod auth;

pub use auth::{ensure_owner, require_auth, AUTH_COOKIE};
