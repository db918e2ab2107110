//! # Authentication and Access Control
//!
//! - JWT access and refresh tokens
//! - Argon2id password hashing
//! - Role classifier over the closed set of global roles
//! - Project membership lookup and reconciliation
//! - The access gate consulted by every handler

pub mod access;
pub mod jwt;
pub mod membership;
pub mod password;
pub mod principal;
pub mod roles;

pub use access::AccessGate;
pub use jwt::{create_access_token, create_token, extract_bearer_token, validate_token, Claims, JwtConfig, TokenType};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordConfig};
pub use principal::{normalize_login, require_principal, resolve_principal, resolve_principal_by_id, Principal};
pub use roles::RoleSet;
pub use secrecy;
