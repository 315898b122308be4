//! HTTP request handlers for the connector endpoints.
//!
//! Handlers are async functions that receive Axum extractors and return
//! `Result<impl IntoResponse, AppError>`. Authentication is an extractor
//! ([`RequireApiKey`](crate::middleware::api_key::RequireApiKey)), so a
//! handler that does not ask for it is public.

pub mod health;
pub mod posts;

use std::sync::Arc;

use crate::{config::ConnectorConfig, publisher::Publisher};

/// State shared by every route, handed out through [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConnectorConfig>,
    /// Stateless between requests, so one instance serves them all.
    pub publisher: Arc<Publisher>,
}
