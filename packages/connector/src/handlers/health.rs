//! Liveness probe: `GET /health`.

/// `GET /health`
///
/// Always `200 OK` with a plain-text body. No authentication, no request
/// tracing.
pub async fn health() -> &'static str {
    "OK"
}
