//! # Data Transfer Objects
//!
//! Request and response types for the API. Requests derive
//! [`validator::Validate`]; enum-valued fields arrive as strings and are
//! parsed with [`parse_enum`] so a bad value is a validation error rather
//! than a body rejection.

use std::str::FromStr;

use entity::sea_orm_active_enums::UnknownVariant;
use error::{AppError, PaginationMeta, Result};
use serde::{Deserialize, Serialize};

pub mod analytics;
pub mod attachments;
pub mod auth;
pub mod comments;
pub mod milestones;
pub mod projects;
pub mod tasks;
pub mod time_logs;
pub mod users;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Parse an enum-valued request field.
pub fn parse_enum<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: UnknownVariant| AppError::validation(format!("{field}: {e}")))
}

/// Paging parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// Page number (1-based, default: 1)
    pub page:     Option<u64>,
    /// Items per page (default: 20, max: 100)
    pub per_page: Option<u64>,
}

impl PageParams {
    /// Resolved `(page, per_page)`; out-of-range values are rejected, not
    /// clamped.
    pub fn resolve(&self) -> Result<(u64, u64)> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::validation("page must be at least 1"));
        }
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok((page, per_page))
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items:      Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use entity::sea_orm_active_enums::{ProjectRole, TaskStatus};

    use super::*;

    #[test]
    fn test_page_params_defaults() {
        assert_eq!(PageParams::default().resolve().unwrap(), (1, DEFAULT_PER_PAGE));
    }

    #[test]
    fn test_page_params_bounds() {
        let params = |page, per_page| {
            PageParams {
                page:     Some(page),
                per_page: Some(per_page),
            }
        };
        assert_eq!(params(3, 100).resolve().unwrap(), (3, 100));
        assert!(matches!(params(0, 10).resolve(), Err(AppError::Validation { .. })));
        assert!(matches!(params(1, 0).resolve(), Err(AppError::Validation { .. })));
        assert!(matches!(params(1, 101).resolve(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(parse_enum::<ProjectRole>("role", "team_lead").unwrap(), ProjectRole::TeamLead);
        let err = parse_enum::<TaskStatus>("status", "finished").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref message) if message.starts_with("status:")));
    }
}
