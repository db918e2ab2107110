//! # Authentication Middleware
//!
//! Protects the API routes:
//! 1. Extracts the Bearer token from the Authorization header
//! 2. Validates it as an access token
//! 3. Rejects revoked tokens
//! 4. Re-loads the principal by its login so deactivation and role changes
//!    take effect on the next request
//! 5. Adds the [`AuthenticatedUser`] to the request extensions

use auth::{extract_bearer_token, resolve_principal, validate_token, Claims, Principal, TokenType};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use error::{AppError, Result};

use crate::{token_revocation::hash_token_for_revocation, AppState};

/// The principal behind a request, with the token it presented.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub principal: Principal,
    pub claims:    Claims,
    /// Raw access token, kept so logout can revoke it
    pub token:     String,
}

/// Authentication middleware, installed with `from_fn_with_state`.
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header encoding"))?;
    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?
        .to_string();

    let claims = validate_token(&state.jwt_config, &token, TokenType::Access)?;

    // Fail closed when the revocation store cannot answer.
    let revoked = state
        .revocations
        .is_revoked(&hash_token_for_revocation(&token))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to check token revocation, denying request");
            AppError::unauthorized("Authentication service temporarily unavailable")
        })?;
    if revoked {
        return Err(AppError::unauthorized("Token has been revoked"));
    }

    let principal = resolve_principal(&state.db, &claims.email).await?;
    if principal.id != claims.user_id()? {
        return Err(AppError::JwtInvalidToken);
    }

    request.extensions_mut().insert(AuthenticatedUser {
        principal,
        claims,
        token,
    });
    Ok(next.run(request).await)
}
