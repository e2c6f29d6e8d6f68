//! Bearer token authentication
//!
//! Tokens are issued by the external identity system and signed with the shared HS256 secret.
//! `auth_middleware` runs on every route; handlers choose between [`CurrentUser`] (required)
//! and [`MaybeUser`] (optional) extractors.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtKeys;
pub use middleware::auth_middleware;
pub use models::{CurrentUser, JwtClaims, MaybeUser};
