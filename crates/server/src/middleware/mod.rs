//! # HTTP Middleware
//!
//! - [`auth`]: bearer-token authentication and principal resolution
//! - [`request_id`]: request correlation ids and the per-request span

pub mod auth;
pub mod request_id;

pub use self::auth::{auth_middleware, AuthenticatedUser};
pub use self::request_id::request_id_middleware;
