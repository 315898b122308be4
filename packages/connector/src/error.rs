//! Application-level error type returned by handlers.
//!
//! All variants serialise to the [`ErrorResponse`] JSON format and map to
//! the appropriate HTTP status code. Every publishing failure is a 500; the
//! status code does not distinguish failure kinds.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use threadpost_connector_api::{error::codes, ErrorResponse};

use crate::publisher::PublishError;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    /// Malformed JSON body.
    InvalidJson(String),
    /// Body parsed but carries neither text nor an image.
    MissingContent(String),
    /// The thread could not be (fully) published.
    PublishFailed(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidJson(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_JSON, msg),
            AppError::MissingContent(msg) => {
                (StatusCode::BAD_REQUEST, codes::MISSING_CONTENT, msg)
            }
            AppError::PublishFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::PUBLISH_FAILED, msg)
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg)
            }
        };
        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

impl From<PublishError> for AppError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::EmptyContent => AppError::MissingContent(e.to_string()),
            PublishError::Step { .. } => AppError::PublishFailed(format!("Failed to create post: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threads::ThreadsError;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use threadpost::UnitRole;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn publish_failure_is_500_with_message() {
        let err = PublishError::Step {
            stage: crate::publisher::PublishStage::AwaitReady,
            unit: UnitRole::Chunk(1),
            source: ThreadsError::ReadinessTimeout {
                container_id: "c2".into(),
                waited: Duration::from_secs(30),
            },
            published: vec!["p1".into()],
        };

        let resp = AppError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(resp).await;
        assert_eq!(json["code"], "publish_failed");
        assert_eq!(
            json["error"],
            "Failed to create post: failed to wait for container readiness for chunk 1: \
             timed out after 30s waiting for container c2 to be ready"
        );
    }

    #[tokio::test]
    async fn empty_content_is_400() {
        let resp = AppError::from(PublishError::EmptyContent).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
