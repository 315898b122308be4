//! `threads-connector`: HTTP service that publishes to Threads.
//!
//! # Quick start
//!
//! ```sh
//! THREADS_USER_ID=1234 THREADS_ACCESS_TOKEN=... API_KEY=secret threads-connector
//!
//! curl -X POST localhost:8080/threads/post \
//!      -H 'X-API-Key: secret' -H 'Content-Type: application/json' \
//!      -d '{"text": "hello", "url": "https://example.com"}'
//! ```
//!
//! Variables may also come from a `.env` file in the working directory.
//! See [`ConnectorConfig`] for the full list.

use std::sync::Arc;

use threadpost_connector::{
    build_router, diagnostics, ConnectorConfig, GraphClient, Publisher, SystemClock,
};

#[tokio::main]
async fn main() {
    // Before the subscriber so RUST_LOG from .env takes effect.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "threadpost_connector=info,threads_connector=info,tower_http=debug".into()
            }),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::info!("loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("no .env file loaded: {e}"),
    }

    let config = ConnectorConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("configuration error: {e}");
        std::process::exit(1);
    });

    let client = GraphClient::from_config(&config).unwrap_or_else(|e| {
        tracing::error!("failed to build Graph API client: {e}");
        std::process::exit(1);
    });

    diagnostics::report_token_status(&client).await;

    let publisher = Arc::new(Publisher::new(
        Arc::new(client),
        Arc::new(SystemClock),
        config.timing,
    ));

    let bind_addr = config.bind_addr;
    let app = build_router(config, publisher);

    tracing::info!("listening on {bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    axum::serve(listener, app).await.expect("server error");
}
