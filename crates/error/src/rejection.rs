//! # Rejection Conversions
//!
//! Turns axum extractor rejections into [`AppError`] so malformed input
//! renders in the standard error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};

use crate::AppError;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        // serde reports "missing field `name` at line 1 column 2"
        if let Some(start) = text.find("missing field `") {
            let rest = &text[start + "missing field `".len() ..];
            if let Some(end) = rest.find('`') {
                return Self::validation(format!("Missing required field: {}", &rest[.. end]));
            }
        }
        Self::validation(text)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self { Self::validation(format!("Invalid query string: {}", rejection.body_text())) }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self { Self::validation(format!("Invalid path parameter: {}", rejection.body_text())) }
}
