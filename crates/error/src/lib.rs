//! # Trellis Error Infrastructure
//!
//! Error types and API error responses for the Trellis service.
//!
//! Every fallible operation in the workspace returns [`Result`], and errors
//! travel unmodified with `?` up to the HTTP boundary where
//! [`AppError`]'s `IntoResponse` implementation renders them as a JSON
//! envelope with the matching status code.

use http::StatusCode;

pub mod middleware;
pub mod rejection;
pub mod response;
pub mod traits;

pub use middleware::ErrorHandler;
pub use response::{ApiResponse, PaginationMeta};
pub use traits::{OptionExt, ResultExt};

/// Convenience type alias for Result with AppError.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Main application error type.
///
/// Every variant except the token failures carries a human-readable message
/// that is safe to show to the caller for 4xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("NotFound: {0}")]
    NotFound(String),

    #[error("BadRequest: {0}")]
    BadRequest(String),

    /// No authenticated principal, or credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("JwtExpired: Token has expired")]
    JwtExpired,

    #[error("JwtInvalidSignature: Invalid token signature")]
    JwtInvalidSignature,

    #[error("JwtInvalidToken: Invalid token")]
    JwtInvalidToken,

    /// The principal is known but lacks the role or membership required.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before any state was touched.
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Internal: {0}")]
    Internal(String),

    #[error("Database: {0}")]
    Database(String),

    #[error("IO: {0}")]
    Io(String),

    #[error("Config: {0}")]
    Config(String),
}

impl AppError {
    #[inline]
    pub fn not_found(what: impl ToString) -> Self { Self::NotFound(what.to_string()) }

    #[inline]
    pub fn bad_request(message: impl ToString) -> Self { Self::BadRequest(message.to_string()) }

    #[inline]
    pub fn unauthorized(message: impl ToString) -> Self { Self::Unauthorized(message.to_string()) }

    #[inline]
    pub fn forbidden(message: impl ToString) -> Self { Self::Forbidden(message.to_string()) }

    #[inline]
    pub fn conflict(message: impl ToString) -> Self { Self::Conflict(message.to_string()) }

    #[inline]
    pub fn validation(message: impl ToString) -> Self { Self::Validation(message.to_string()) }

    #[inline]
    pub fn internal(message: impl ToString) -> Self { Self::Internal(message.to_string()) }

    #[inline]
    pub fn database(message: impl ToString) -> Self { Self::Database(message.to_string()) }

    #[inline]
    pub fn config(message: impl ToString) -> Self { Self::Config(message.to_string()) }

    /// HTTP status and machine readable code.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::JwtExpired => (StatusCode::UNAUTHORIZED, "JWT_EXPIRED"),
            Self::JwtInvalidSignature => (StatusCode::UNAUTHORIZED, "JWT_INVALID_SIGNATURE"),
            Self::JwtInvalidToken => (StatusCode::UNAUTHORIZED, "JWT_INVALID_TOKEN"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            Self::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        }
    }

    /// Get the HTTP status code.
    #[inline]
    pub fn status(&self) -> StatusCode { self.classify().0 }

    /// Get the machine readable error code.
    #[inline]
    pub fn code(&self) -> &'static str { self.classify().1 }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            Self::JwtExpired => "Token has expired".to_string(),
            Self::JwtInvalidSignature => "Invalid token signature".to_string(),
            Self::JwtInvalidToken => "Invalid token".to_string(),
            Self::NotFound(message) |
            Self::BadRequest(message) |
            Self::Unauthorized(message) |
            Self::Forbidden(message) |
            Self::Conflict(message) |
            Self::Validation(message) |
            Self::Internal(message) |
            Self::Database(message) |
            Self::Io(message) |
            Self::Config(message) => message.clone(),
        }
    }

    /// Whether the error is the client's fault (4xx).
    pub fn is_client_error(&self) -> bool { self.status().is_client_error() }

    /// Prefix the message with additional context.
    ///
    /// Token errors carry no message and are returned unchanged.
    pub fn context(self, context: impl ToString) -> Self {
        let context = context.to_string();
        self.map_message(|message| format!("{context}: {message}"))
    }

    fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::NotFound(m) => Self::NotFound(f(m)),
            Self::BadRequest(m) => Self::BadRequest(f(m)),
            Self::Unauthorized(m) => Self::Unauthorized(f(m)),
            Self::Forbidden(m) => Self::Forbidden(f(m)),
            Self::Conflict(m) => Self::Conflict(f(m)),
            Self::Validation(m) => Self::Validation(f(m)),
            Self::Internal(m) => Self::Internal(f(m)),
            Self::Database(m) => Self::Database(f(m)),
            Self::Io(m) => Self::Io(f(m)),
            Self::Config(m) => Self::Config(f(m)),
            token @ (Self::JwtExpired | Self::JwtInvalidSignature | Self::JwtInvalidToken) => token,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self { Self::Internal(format!("{err:#}")) }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Unique index violations surface as conflicts.
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::Conflict(format!("Unique constraint violated: {detail}"));
        }
        match err {
            sea_orm::DbErr::RecordNotFound(what) => Self::NotFound(what),
            other => Self::Database(other.to_string()),
        }
    }
}

impl<E> From<sea_orm::TransactionError<E>> for AppError
where
    E: Into<AppError> + std::error::Error,
{
    fn from(err: sea_orm::TransactionError<E>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(db) => db.into(),
            sea_orm::TransactionError::Transaction(inner) => inner.into(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self { Self::Internal(format!("Redis error: {err}")) }
}

/// Field messages are sorted and joined so the output is stable.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field}: invalid value"), |m| m.to_string())
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            Self::Validation("Validation failed".to_string())
        }
        else {
            Self::Validation(messages.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn test_error_not_found() {
        let err = AppError::not_found("Project not found");
        assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_error_forbidden() {
        let err = AppError::forbidden("Not a member of this project");
        assert_eq!(err.status(), http::StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(err.message(), "Not a member of this project");
    }

    #[test]
    fn test_error_unauthorized_family() {
        for err in [
            AppError::unauthorized("Missing token"),
            AppError::JwtExpired,
            AppError::JwtInvalidSignature,
            AppError::JwtInvalidToken,
        ] {
            assert_eq!(err.status(), http::StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_error_validation_is_bad_request() {
        let err = AppError::validation("end_date precedes start_date");
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_error_conflict() {
        let err = AppError::conflict("User is already a member of this project");
        assert_eq!(err.status(), http::StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn test_server_errors() {
        for err in [
            AppError::internal("boom"),
            AppError::database("connection reset"),
            AppError::config("missing secret"),
        ] {
            assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn test_context_prefixes_message() {
        let err = AppError::not_found("task 9").context("Loading comment");
        assert_eq!(err.message(), "Loading comment: task 9");
        assert_eq!(AppError::JwtExpired.context("ignored"), AppError::JwtExpired);
    }

    #[test]
    fn test_from_record_not_found() {
        let err: AppError = sea_orm::DbErr::RecordNotFound("project".to_string()).into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_from_other_db_error() {
        let err: AppError = sea_orm::DbErr::Custom("bad".to_string()).into();
        assert!(matches!(err, AppError::Database { .. }));
    }

    #[test]
    fn test_from_io_error() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.code(), "IO_ERROR");
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name:  String,
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn test_from_validation_errors() {
        let sample = Sample {
            name:  String::new(),
            email: "nope".to_string(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.message(), "Invalid email address, Name is required");
    }
}
