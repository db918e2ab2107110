//! # JWT Token Management
//!
//! HS256 access and refresh tokens. The subject is the account id and the
//! `email` claim carries the login the principal resolver looks up.

use std::collections::HashSet;

use base64::Engine;
use chrono::Utc;
use error::{AppError, Result};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::Principal;

/// Minimum decoded secret length for HS256.
pub const MIN_SECRET_BYTES: usize = 32;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Base64 encoded signing secret
    pub secret:              SecretString,
    pub issuer:              String,
    pub audience:            String,
    pub access_ttl_seconds:  u64,
    pub refresh_ttl_seconds: u64,
}

impl JwtConfig {
    /// Check that the secret decodes and is long enough.
    pub fn validate(&self) -> Result<()> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(self.secret.expose_secret())
            .map_err(|e| AppError::config(format!("JWT secret is not valid base64: {e}")))?;
        if decoded.len() < MIN_SECRET_BYTES {
            return Err(AppError::config(format!(
                "JWT secret must decode to at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        if self.access_ttl_seconds == 0 || self.refresh_ttl_seconds == 0 {
            return Err(AppError::config("JWT lifetimes must be positive"));
        }
        Ok(())
    }

    fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_base64_secret(self.secret.expose_secret())
            .map_err(|e| AppError::config(format!("Invalid JWT secret: {e}")))
    }

    fn decoding_key(&self) -> Result<DecodingKey> {
        DecodingKey::from_base64_secret(self.secret.expose_secret())
            .map_err(|e| AppError::config(format!("Invalid JWT secret: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub:        String,
    /// Login of the account
    pub email:      String,
    /// Granted-authority tags at issue time
    pub roles:      Vec<String>,
    pub token_type: TokenType,
    pub iss:        String,
    pub aud:        String,
    pub exp:        u64,
    pub iat:        u64,
    /// Unique token id
    pub jti:        String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> { Uuid::parse_str(&self.sub).map_err(|_| AppError::JwtInvalidToken) }

    /// Seconds until expiry, zero when already expired.
    pub fn remaining_seconds(&self) -> u64 { self.exp.saturating_sub(now_secs()) }
}

fn now_secs() -> u64 { u64::try_from(Utc::now().timestamp()).unwrap_or_default() }

/// Creates a signed token of the given type for `principal`.
pub fn create_token(config: &JwtConfig, principal: &Principal, token_type: TokenType) -> Result<(String, Claims)> {
    let ttl = match token_type {
        TokenType::Access => config.access_ttl_seconds,
        TokenType::Refresh => config.refresh_ttl_seconds,
    };
    let iat = now_secs();
    let claims = Claims {
        sub: principal.id.to_string(),
        email: principal.email.clone(),
        roles: principal.roles().tags(),
        token_type,
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        exp: iat + ttl,
        iat,
        jti: cuid2::create_id(),
    };
    let token = jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key()?)
        .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;
    Ok((token, claims))
}

/// Creates a new access token.
pub fn create_access_token(config: &JwtConfig, principal: &Principal) -> Result<String> {
    create_token(config, principal, TokenType::Access).map(|(token, _)| token)
}

/// Validates a token of the expected type and returns its claims.
///
/// # Errors
///
/// `JwtExpired`, `JwtInvalidSignature` or `JwtInvalidToken`; a refresh
/// token presented as an access token (or the reverse) is invalid.
pub fn validate_token(config: &JwtConfig, token: &str, expected: TokenType) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.iss = Some(HashSet::from([config.issuer.clone()]));
    validation.aud = Some(HashSet::from([config.audience.clone()]));
    validation.leeway = 0;
    validation.validate_exp = true;

    let data = jsonwebtoken::decode::<Claims>(token, &config.decoding_key()?, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::JwtExpired,
            ErrorKind::InvalidSignature => AppError::JwtInvalidSignature,
            _ => AppError::JwtInvalidToken,
        }
    })?;
    if data.claims.token_type != expected {
        return Err(AppError::JwtInvalidToken);
    }
    Ok(data.claims)
}

/// Extracts the Bearer token from the Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use entity::sea_orm_active_enums::GlobalRole;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret:              SecretString::from(
                base64::engine::general_purpose::STANDARD.encode("test-secret-key-that-is-at-least-32-bytes-long"),
            ),
            issuer:              "trellis-test".to_string(),
            audience:            "trellis-api".to_string(),
            access_ttl_seconds:  900,
            refresh_ttl_seconds: 86_400,
        }
    }

    fn principal() -> Principal {
        Principal {
            id:        Uuid::new_v4(),
            email:     "lead@example.com".to_string(),
            full_name: "Lead".to_string(),
            role:      GlobalRole::TeamLead,
            active:    true,
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = config();
        let p = principal();
        let (token, issued) = create_token(&config, &p, TokenType::Access).unwrap();
        let claims = validate_token(&config, &token, TokenType::Access).unwrap();

        assert_eq!(claims, issued);
        assert_eq!(claims.user_id().unwrap(), p.id);
        assert_eq!(claims.email, "lead@example.com");
        assert_eq!(claims.roles, vec!["ROLE_TEAM_LEAD"]);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let config = config();
        let (refresh, _) = create_token(&config, &principal(), TokenType::Refresh).unwrap();
        assert_eq!(
            validate_token(&config, &refresh, TokenType::Access).unwrap_err(),
            AppError::JwtInvalidToken
        );
        assert!(validate_token(&config, &refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let config = config();
        let p = principal();
        let iat = now_secs() - 120;
        let claims = Claims {
            sub: p.id.to_string(),
            email: p.email.clone(),
            roles: vec![],
            token_type: TokenType::Access,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            exp: iat + 60,
            iat,
            jti: "expired".to_string(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key().unwrap()).unwrap();
        assert_eq!(
            validate_token(&config, &token, TokenType::Access).unwrap_err(),
            AppError::JwtExpired
        );
        assert_eq!(claims.remaining_seconds(), 0);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (token, _) = create_token(&config(), &principal(), TokenType::Access).unwrap();
        let mut other = config();
        other.secret = SecretString::from(
            base64::engine::general_purpose::STANDARD.encode("another-secret-key-that-is-32-bytes-or-more"),
        );
        assert_eq!(
            validate_token(&other, &token, TokenType::Access).unwrap_err(),
            AppError::JwtInvalidSignature
        );
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let (token, _) = create_token(&config(), &principal(), TokenType::Access).unwrap();
        let mut other = config();
        other.audience = "someone-else".to_string();
        assert!(validate_token(&other, &token, TokenType::Access).is_err());
    }

    #[test]
    fn test_config_validate() {
        assert!(config().validate().is_ok());
        let mut short = config();
        short.secret = SecretString::from(base64::engine::general_purpose::STANDARD.encode("short"));
        assert!(matches!(short.validate(), Err(AppError::Config { .. })));
        let mut bad = config();
        bad.secret = SecretString::from("%%%not base64%%%".to_string());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert!(extract_bearer_token("Basic abc123").is_none());
        assert!(extract_bearer_token("Bearer ").is_none());
        assert!(extract_bearer_token("").is_none());
    }
}
