//! # User Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::{sea_orm_active_enums::GlobalRole, users};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PageParams;

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id:         Uuid,
    pub email:      String,
    pub full_name:  String,
    pub role:       GlobalRole,
    pub is_active:  bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id:         user.id,
            email:      user.email,
            full_name:  user.full_name,
            role:       user.role,
            is_active:  user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Query parameters for user list
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserListQuery {
    pub page:     Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive match on email or full name
    #[validate(length(max = 255, message = "Search term must not exceed 255 characters"))]
    pub search:   Option<String>,
}

impl UserListQuery {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page:     self.page,
            per_page: self.per_page,
        }
    }
}

/// Request to change a user's global role
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}
