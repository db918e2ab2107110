//! # Authentication Data Transfer Objects

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::users::UserResponse;

/// Request body for self-registration
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email:     String,
    #[validate(length(min = 1, max = 255, message = "Full name must be between 1 and 255 characters"))]
    pub full_name: String,
    /// Strength rules are checked separately
    pub password:  String,
}

/// Request body for user login
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email:    String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for token refresh
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request body for logout; the refresh token is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Issued token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token:  String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type:    String,
    /// Access token lifetime in seconds
    pub expires_in:    u64,
    pub user:          UserResponse,
}
