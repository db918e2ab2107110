//! # Session Handlers
//!
//! Registration, login, token refresh with rotation, and logout.

use auth::{
    create_token,
    hash_password,
    normalize_login,
    resolve_principal_by_id,
    secrecy::{ExposeSecret, SecretString},
    validate_password_strength,
    validate_token,
    verify_password,
    Principal,
    TokenType,
};
use chrono::Utc;
use entity::{sea_orm_active_enums::GlobalRole, users};
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{load_user, ok, ApiResult};
use crate::{
    dto::{
        auth::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, TokenResponse},
        users::UserResponse,
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    token_revocation::hash_token_for_revocation,
    AppState,
};

/// Issue an access/refresh pair for `user`.
fn issue_tokens(state: &AppState, user: users::Model) -> Result<TokenResponse> {
    let principal = Principal::from(user.clone());
    let (access_token, _) = create_token(&state.jwt_config, &principal, TokenType::Access)?;
    let (refresh_token, _) = create_token(&state.jwt_config, &principal, TokenType::Refresh)?;
    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.access_ttl_seconds,
        user: user.into(),
    })
}

/// Self-registration. New accounts are Developers.
pub async fn register_handler(state: &AppState, req: RegisterRequest) -> ApiResult<UserResponse> {
    req.validate()?;
    validate_password_strength(&req.password).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        AppError::validation(messages.join(", "))
    })?;

    let email = normalize_login(&req.email);
    let taken = users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if taken {
        return Err(AppError::conflict("Email is already registered"));
    }

    let password_hash = hash_password(&SecretString::from(req.password), state.password.clone())?;
    let now = Utc::now();
    // The unique index turns a concurrent registration into Conflict.
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        full_name: Set(req.full_name.trim().to_string()),
        password_hash: Set(password_hash.expose_secret().to_string()),
        role: Set(GlobalRole::Developer),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(user_id = %user.id, "User registered");
    ok(user.into())
}

pub async fn login_handler(state: &AppState, req: LoginRequest) -> ApiResult<TokenResponse> {
    req.validate()?;
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(normalize_login(&req.email)))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    verify_password(&SecretString::from(req.password), &user.password_hash)?;
    if !user.is_active {
        return Err(AppError::unauthorized("Account is deactivated"));
    }

    info!(user_id = %user.id, "User logged in");
    ok(issue_tokens(state, user)?)
}

/// Exchange a refresh token for a new pair. The presented token is
/// revoked so it can be used once.
pub async fn refresh_handler(state: &AppState, req: RefreshRequest) -> ApiResult<TokenResponse> {
    req.validate()?;
    let claims = validate_token(&state.jwt_config, &req.refresh_token, TokenType::Refresh)?;
    let token_hash = hash_token_for_revocation(&req.refresh_token);
    if state.revocations.is_revoked(&token_hash).await? {
        return Err(AppError::unauthorized("Refresh token has been revoked"));
    }

    let principal = resolve_principal_by_id(&state.db, claims.user_id()?).await?;
    state
        .revocations
        .revoke(&token_hash, claims.remaining_seconds())
        .await?;
    let user = load_user(&state.db, principal.id).await?;

    info!(user_id = %principal.id, "Tokens refreshed");
    ok(issue_tokens(state, user)?)
}

/// Revoke the current access token and, when given, the caller's refresh
/// token. Each stays revoked until it would have expired.
pub async fn logout_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    req: LogoutRequest,
) -> ApiResult<MessageResponse> {
    state
        .revocations
        .revoke(
            &hash_token_for_revocation(&user.token),
            user.claims.remaining_seconds(),
        )
        .await?;

    if let Some(refresh_token) = req.refresh_token.as_deref() {
        match validate_token(&state.jwt_config, refresh_token, TokenType::Refresh) {
            Ok(claims) if claims.sub == user.claims.sub => {
                state
                    .revocations
                    .revoke(
                        &hash_token_for_revocation(refresh_token),
                        claims.remaining_seconds(),
                    )
                    .await?;
            },
            Ok(_) => return Err(AppError::forbidden("Refresh token belongs to another account")),
            // Already unusable.
            Err(e) => debug!(error = %e, "Ignoring invalid refresh token on logout"),
        }
    }

    info!(user_id = %user.principal.id, "User logged out");
    ok(MessageResponse::new("Logged out"))
}
