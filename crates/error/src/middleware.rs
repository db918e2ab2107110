//! # Error Responses
//!
//! Conversion of [`AppError`] into HTTP responses.

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::{response::ApiResponse, AppError};

/// Error handler that converts errors to HTTP responses.
///
/// Client errors (4xx) always carry their message. Server errors only do
/// when `include_details` is set; otherwise the body holds a generic text
/// and the real message goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler {
    pub include_details: bool,
}

impl ErrorHandler {
    #[inline]
    pub fn new(include_details: bool) -> Self {
        Self {
            include_details,
        }
    }

    /// Convert an error to a response.
    pub fn to_response(&self, err: &AppError) -> Response {
        let status = err.status();
        let message = if status.is_server_error() {
            tracing::error!(code = err.code(), error = %err, "Request failed");
            if self.include_details {
                err.message()
            }
            else {
                "Internal server error".to_string()
            }
        }
        else {
            err.message()
        };

        let body = ApiResponse::<()>::error(err.code(), message);
        let mut res = (status, Json(body)).into_response();
        if status == http::StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response { ErrorHandler::default().to_response(&self) }
}
