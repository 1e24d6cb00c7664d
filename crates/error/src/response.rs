//! # API Response Types
//!
//! Generic API response envelope and the axum conversion for [`AppError`].
//!
//! ## Response Format
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { ... }
//! }
//! ```

use axum::{body::Body, response::Response};
use serde::{Deserialize, Serialize};

use crate::AppError;

/// API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success {
        success: bool,
        data:    T,
    },
    Error {
        success: bool,
        code:    String,
        message: String,
    },
}

impl<T> ApiResponse<T> {
    /// Wrap data in a success envelope.
    pub fn success(data: T) -> Self {
        Self::Success {
            success: true,
            data,
        }
    }

    /// Build an error envelope.
    pub fn error(code: impl ToString, message: impl ToString) -> Self {
        Self::Error {
            success: false,
            code:    code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PaginationMeta {
    /// Current page number (1-indexed).
    pub page:        u64,
    /// Number of items per page.
    pub per_page:    u64,
    /// Total number of items.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Create pagination metadata; `page` is clamped to at least 1.
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let page = page.max(1);
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

    /// Offset for database queries.
    pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.per_page) }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = ApiResponse::<()>::error(self.code(), self.message());
        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            format!(r#"{{"success":false,"code":"{}","message":"serialization failed"}}"#, self.code())
        });

        Response::builder()
            .status(self.status())
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse as _;

    use super::*;

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(42);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn test_error_envelope() {
        let resp = ApiResponse::<()>::error("CAPACITY_EXCEEDED", "Team is full");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains("CAPACITY_EXCEEDED"));
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(3, 20, 41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.offset(), 40);
    }

    #[test]
    fn test_pagination_meta_clamps_page() {
        let meta = PaginationMeta::new(0, 20, 5);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.offset(), 0);
    }

    #[test]
    fn test_app_error_into_response() {
        let response = AppError::duplicate_evaluation("Already rated").into_response();
        assert_eq!(response.status(), http::StatusCode::CONFLICT);
    }
}
