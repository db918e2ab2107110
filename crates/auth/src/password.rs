//! Password hashing and verification using Argon2id.
//!
//! Hashes are stored in PHC string format so parameters travel with the
//! hash and can be raised later without invalidating existing accounts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm,
    Argon2,
    Params,
    Version,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Verification failed: password does not match")]
    VerificationFailed,

    #[error("Invalid hash format")]
    InvalidHashFormat,
}

impl From<PasswordError> for error::AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::VerificationFailed => error::AppError::unauthorized("Invalid email or password"),
            other => error::AppError::internal(other.to_string()),
        }
    }
}

/// Configuration for Argon2id password hashing.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost:   u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost:   2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Cheapest parameters argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: Params::MIN_M_COST,
            time_cost:   Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes a password using Argon2id.
///
/// ```
/// use auth::password::{hash_password, verify_password, PasswordConfig};
/// use secrecy::{ExposeSecret, SecretString};
///
/// let password = SecretString::from("correct horse battery staple".to_string());
/// let hash = hash_password(&password, Some(PasswordConfig::insecure_fast())).unwrap();
/// assert!(verify_password(&password, hash.expose_secret()).is_ok());
/// ```
pub fn hash_password(password: &SecretString, config: Option<PasswordConfig>) -> Result<SecretString, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = config
        .unwrap_or_default()
        .hasher()?
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(SecretString::from(hash.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// Parameters are read from the hash itself; the comparison is constant
/// time.
pub fn verify_password(password: &SecretString, expected_hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(expected_hash).map_err(|_| PasswordError::InvalidHashFormat)?;
    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .map_err(|e| {
            match e {
                argon2::password_hash::Error::Password => PasswordError::VerificationFailed,
                other => PasswordError::HashingFailed(other.to_string()),
            }
        })
}

/// Errors for password validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordValidationError {
    #[error("Password must be at least 10 characters long")]
    TooShort,

    #[error("Password must be at most 128 characters long")]
    TooLong,

    #[error("Password must contain at least one letter")]
    MissingLetter,

    #[error("Password must contain at least one digit")]
    MissingDigit,
}

/// Checks if a password is strong enough.
pub fn validate_password_strength(password: &str) -> Result<(), Vec<PasswordValidationError>> {
    let mut errors = Vec::new();
    let len = password.chars().count();

    if len < 10 {
        errors.push(PasswordValidationError::TooShort);
    }
    if len > 128 {
        errors.push(PasswordValidationError::TooLong);
    }
    if !password.chars().any(char::is_alphabetic) {
        errors.push(PasswordValidationError::MissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(PasswordValidationError::MissingDigit);
    }

    if errors.is_empty() {
        Ok(())
    }
    else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Option<PasswordConfig> { Some(PasswordConfig::insecure_fast()) }

    #[test]
    fn test_hash_and_verify() {
        let password = SecretString::from("TestPassword123!".to_string());
        let hash = hash_password(&password, fast()).unwrap();
        assert!(hash.expose_secret().starts_with("$argon2id$"));
        assert!(verify_password(&password, hash.expose_secret()).is_ok());
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password(&SecretString::from("CorrectPassword1".to_string()), fast()).unwrap();
        let err = verify_password(&SecretString::from("WrongPassword1".to_string()), hash.expose_secret()).unwrap_err();
        assert!(matches!(err, PasswordError::VerificationFailed));
    }

    #[test]
    fn test_salts_differ() {
        let password = SecretString::from("SamePassword99".to_string());
        let a = hash_password(&password, fast()).unwrap();
        let b = hash_password(&password, fast()).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn test_garbage_hash_is_rejected() {
        let err = verify_password(&SecretString::from("whatever1".to_string()), "not-a-hash").unwrap_err();
        assert!(matches!(err, PasswordError::InvalidHashFormat));
    }

    #[test]
    fn test_password_validation() {
        assert_eq!(
            validate_password_strength("abc"),
            Err(vec![PasswordValidationError::TooShort, PasswordValidationError::MissingDigit])
        );
        assert!(validate_password_strength("longenough42").is_ok());
        assert_eq!(
            validate_password_strength("1234567890"),
            Err(vec![PasswordValidationError::MissingLetter])
        );
    }
}
