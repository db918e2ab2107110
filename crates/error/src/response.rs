//! # API Response Types
//!
//! The envelope used for error bodies and pagination metadata shared by the
//! list endpoints.
//!
//! ```json
//! { "status": "error", "code": "FORBIDDEN", "message": "...", "requestId": "..." }
//! ```

use serde::{Deserialize, Serialize};

/// API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ApiResponse<T> {
    /// Success response.
    #[serde(rename = "success")]
    Success {
        data: T,
    },
    /// Error response.
    #[serde(rename = "error", rename_all = "camelCase")]
    Error {
        code:       String,
        message:    String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        request_id: Option<String>,
    },
}

impl<T> ApiResponse<T> {
    #[inline]
    pub fn success(data: T) -> Self {
        Self::Success {
            data,
        }
    }

    #[inline]
    pub fn error(code: impl ToString, message: impl ToString) -> Self {
        Self::Error {
            code:       code.to_string(),
            message:    message.to_string(),
            request_id: None,
        }
    }

    /// Attach a request id to an error response. No-op on success.
    pub fn with_request_id(mut self, id: impl ToString) -> Self {
        if let Self::Error {
            request_id,
            ..
        } = &mut self
        {
            *request_id = Some(id.to_string());
        }
        self
    }

    #[inline]
    pub fn is_success(&self) -> bool { matches!(self, Self::Success { .. }) }
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PaginationMeta {
    /// Current page number (1-indexed).
    pub page:        u64,
    pub per_page:    u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Build pagination metadata; `per_page` of zero yields zero pages.
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        }
        else {
            total_items.div_ceil(per_page)
        };
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    #[inline]
    pub fn has_next(&self) -> bool { self.page < self.total_pages }

    /// Offset for database queries, `None` on overflow.
    pub fn offset(&self) -> Option<u64> { self.page.checked_sub(1)?.checked_mul(self.per_page) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = ApiResponse::<()>::error("FORBIDDEN", "Access denied").with_request_id("req-1");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "Access denied");
        assert_eq!(json["requestId"], "req-1");
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = ApiResponse::success(vec![1, 2]);
        assert!(body.is_success());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(2, 20, 41);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next());
        assert_eq!(meta.offset(), Some(20));

        let last = PaginationMeta::new(3, 20, 41);
        assert!(!last.has_next());
        assert_eq!(PaginationMeta::new(1, 0, 5).total_pages, 0);
        assert_eq!(PaginationMeta::new(0, 10, 5).offset(), None);
    }
}
