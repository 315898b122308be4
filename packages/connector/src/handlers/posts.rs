//! Publishing handler: `POST /threads/post`.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use threadpost::ContentRequest;
use threadpost_connector_api::{PostRequest, PostResponse};
use tracing::{info, warn};

use crate::{error::AppError, middleware::api_key::RequireApiKey, publisher::PublishError};

use super::AppState;

/// Characters of post text echoed into the request log.
const LOG_SNIPPET_CHARS: usize = 50;

/// `POST /threads/post`: publish text, an image, and/or a link.
///
/// Requires `X-API-Key`. Returns `{"post_id": ...}` with the id of the root
/// post, 400 for a malformed body or one with neither `text` nor `image_url`,
/// and 500 with the failure description if publishing fails at any step.
///
/// The thread is published on a detached task that the handler awaits, so a
/// client that disconnects mid-request does not leave the thread half-built
/// by cancellation.
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let Json(request) =
        body.map_err(|e| AppError::InvalidJson(format!("Invalid request body: {}", e.body_text())))?;

    if !request.has_primary_content() {
        return Err(AppError::MissingContent(
            "Content (text or image_url) is required".into(),
        ));
    }

    let text = request.text.as_deref().unwrap_or("");
    info!(
        "processing post request: text={:?} (len={}), image={}, url={}",
        snippet(text),
        text.chars().count(),
        request.image_url.is_some(),
        request.url.as_deref().unwrap_or(""),
    );

    let content = ContentRequest::from(request);
    let publisher = Arc::clone(&state.publisher);
    let task = tokio::spawn(async move { publisher.create_post(&content).await });

    let post_id = task
        .await
        .map_err(|e| AppError::Internal(format!("publishing task failed: {e}")))?
        .map_err(|e: PublishError| {
            warn!("error creating post: {e}");
            AppError::from(e)
        })?;

    info!("successfully created post: {post_id}");
    Ok(Json(PostResponse { post_id }))
}

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
