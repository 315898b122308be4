//! Shared-secret API key authentication.
//!
//! [`RequireApiKey`] is an Axum extractor that rejects the request with 401
//! unless the `X-API-Key` header equals the configured key.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use threadpost_connector_api::{error::codes, ErrorResponse, API_KEY_HEADER};

use crate::handlers::AppState;

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

/// An authentication failure that maps to HTTP 401.
#[derive(Debug)]
pub struct AuthError(pub String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(codes::UNAUTHORIZED, self.0);
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// RequireApiKey extractor
// ---------------------------------------------------------------------------

/// Axum extractor that requires a matching `X-API-Key` header.
pub struct RequireApiKey;

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = AppState::from_ref(state);
        let result = check_api_key(parts, &app_state.config.api_key);
        async move {
            result.map_err(|reason| {
                tracing::warn!("rejected request: {reason}");
                AuthError("Unauthorized".into())
            })?;
            Ok(RequireApiKey)
        }
    }
}

/// Compare the request's `X-API-Key` header against `expected`.
pub(crate) fn check_api_key(parts: &Parts, expected: &str) -> Result<(), &'static str> {
    let presented = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or("missing X-API-Key header")?;

    if expected.is_empty() || !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        return Err("incorrect X-API-Key");
    }
    Ok(())
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/threads/post");
        if let Some(value) = header {
            builder = builder.header("X-API-Key", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn matching_key_passes() {
        assert!(check_api_key(&parts_with(Some("s3cret")), "s3cret").is_ok());
    }

    #[test]
    fn missing_key_is_rejected() {
        assert_eq!(
            check_api_key(&parts_with(None), "s3cret"),
            Err("missing X-API-Key header")
        );
        assert!(check_api_key(&parts_with(Some("")), "s3cret").is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        assert_eq!(
            check_api_key(&parts_with(Some("s3cres")), "s3cret"),
            Err("incorrect X-API-Key")
        );
        assert!(check_api_key(&parts_with(Some("s3cret-longer")), "s3cret").is_err());
    }

    #[test]
    fn empty_expected_key_never_matches() {
        assert!(check_api_key(&parts_with(Some("anything")), "").is_err());
    }
}
