//! # Principal Resolver
//!
//! Turns the authenticated login of a request into a persisted account.

use entity::{sea_orm_active_enums::GlobalRole, users};
use error::{AppError, Result};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::roles::RoleSet;

/// The acting user of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id:        Uuid,
    pub email:     String,
    pub full_name: String,
    pub role:      GlobalRole,
    pub active:    bool,
}

impl Principal {
    /// Effective roles. Deactivated accounts hold none.
    pub fn roles(&self) -> RoleSet {
        if self.active {
            RoleSet::single(self.role)
        }
        else {
            RoleSet::empty()
        }
    }
}

impl From<users::Model> for Principal {
    fn from(user: users::Model) -> Self {
        Self {
            id:        user.id,
            email:     user.email,
            full_name: user.full_name,
            role:      user.role,
            active:    user.is_active,
        }
    }
}

/// Logins are case-insensitive and stored lower-cased.
pub fn normalize_login(login: &str) -> String { login.trim().to_lowercase() }

/// Resolve an active principal by login.
///
/// # Errors
///
/// `Unauthorized` when no account matches or the account is deactivated.
pub async fn resolve_principal<C: ConnectionTrait>(db: &C, login: &str) -> Result<Principal> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(normalize_login(login)))
        .one(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Unknown principal"))?;
    ensure_active(user.into())
}

/// Resolve an active principal by id.
pub async fn resolve_principal_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Principal> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Unknown principal"))?;
    ensure_active(user.into())
}

fn ensure_active(principal: Principal) -> Result<Principal> {
    if !principal.active {
        tracing::debug!(user_id = %principal.id, "Rejected deactivated principal");
        return Err(AppError::unauthorized("Account is deactivated"));
    }
    Ok(principal)
}

/// The current principal, or an authorization failure when there is none.
pub fn require_principal(principal: Option<&Principal>) -> Result<&Principal> {
    principal.ok_or_else(|| AppError::unauthorized("Authentication required"))
}
