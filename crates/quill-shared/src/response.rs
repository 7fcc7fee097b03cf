//! Standardized API response envelope.
//!
//! Every endpoint answers with `{ success, data?, error?, count?, total?,
//! totalPages?, currentPage?, message? }`.

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            total: None,
            total_pages: None,
            current_page: None,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self::ok(data).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list response; `count` is the number of items in this response.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::ok(items)
        }
    }

    /// One page of a paginated listing.
    pub fn page(items: Vec<T>, total: u64, total_pages: u64, current_page: u64) -> Self {
        Self {
            total: Some(total),
            total_pages: Some(total_pages),
            current_page: Some(current_page),
            ..Self::list(items)
        }
    }
}

/// Empty object used as `data` for delete responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Error body: `{ "success": false, "error": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }

    /// The message sent for unexpected failures; details stay in the logs.
    pub fn server_error() -> Self {
        Self::new("Server Error")
    }
}
