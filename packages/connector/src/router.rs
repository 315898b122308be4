//! Assembles the Axum [`Router`] from the handler modules.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use threadpost_connector_api::{HEALTH_PATH, POST_PATH};
use tower_http::trace::TraceLayer;

use crate::{
    config::ConnectorConfig,
    handlers::{health, posts, AppState},
    publisher::Publisher,
};

/// Build the complete application router with shared state.
///
/// Only the publishing route is traced; health probes arrive often enough to
/// drown everything else out.
pub fn build_router(config: ConnectorConfig, publisher: Arc<Publisher>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        publisher,
    };

    Router::new()
        .route(HEALTH_PATH, get(health::health))
        .route(
            POST_PATH,
            post(posts::create).layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
