//! Standard error response body.

use serde::{Deserialize, Serialize};

/// The JSON body returned for all error responses.
///
/// ```json
/// { "error": "Failed to create post: failed to publish for chunk 2: API error: 400 Bad Request - ...", "code": "publish_failed" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `invalid_json` | 400 |
    /// | `missing_content` | 400 |
    /// | `unauthorized` | 401 |
    /// | `publish_failed` | 500 |
    /// | `internal_error` | 500 |
    pub code: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a static code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

/// Well-known error codes.
pub mod codes {
    pub const INVALID_JSON: &str = "invalid_json";
    pub const MISSING_CONTENT: &str = "missing_content";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const PUBLISH_FAILED: &str = "publish_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
}
