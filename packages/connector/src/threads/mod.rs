//! Threads Graph API access: the three container operations and readiness
//! polling.
//!
//! Publishing on Threads is asynchronous. A post is first created as a
//! *container*, the container is processed remotely, and only a `FINISHED`
//! container can be published. [`ThreadsApi`] exposes the three remote calls;
//! [`readiness::wait_until_ready`] polls between create and publish.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`GraphClient`] | Production; talks to `graph.threads.net` (or a configured base URL) |
//! | `mock::ScriptedApi` | Unit tests; records calls and replays scripted statuses |
//!
//! [`GraphClient`]: client::GraphClient

pub mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod readiness;

use std::time::Duration;

use async_trait::async_trait;
use threadpost::{ContainerStatus, PostUnit};

pub use client::{GraphClient, TokenInfo};
pub use readiness::{wait_until_ready, ReadinessPolicy};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A non-success HTTP response from the Graph API.
///
/// `message` comes from the Graph error envelope when it parses, otherwise
/// it is the raw response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiError {
    pub status: u16,
    /// Status line as text, e.g. `"400 Bad Request"`.
    pub status_text: String,
    pub message: String,
    pub user_title: Option<String>,
    pub user_message: Option<String>,
    pub code: Option<i64>,
    pub error_subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}

impl std::fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error: {} - {}", self.status_text, self.message)?;
        if let Some(title) = &self.user_title {
            write!(
                f,
                " ({}: {})",
                title,
                self.user_message.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteApiError {}

/// Errors surfaced by Graph API operations.
#[derive(Debug, thiserror::Error)]
pub enum ThreadsError {
    /// The request never got a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Graph API answered with a non-success status.
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    /// The container reported `ERROR` or `EXPIRED`.
    #[error("container {container_id} {status}: {reason}")]
    ContainerFailed {
        container_id: String,
        status: ContainerStatus,
        reason: String,
    },

    /// The container was still processing when the polling deadline passed.
    #[error("timed out after {waited:?} waiting for container {container_id} to be ready")]
    ReadinessTimeout {
        container_id: String,
        waited: Duration,
    },

    /// A success response whose body did not match the expected shape.
    #[error("failed to decode {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// ContainerState
// ---------------------------------------------------------------------------

/// One observation of a container from the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub id: String,
    pub status: ContainerStatus,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// ThreadsApi trait
// ---------------------------------------------------------------------------

/// The remote container operations the publisher depends on.
///
/// Implementations must be `Send + Sync + 'static` so they can be held in an
/// `Arc<dyn ThreadsApi>` and shared across concurrent requests.
#[async_trait]
pub trait ThreadsApi: Send + Sync + 'static {
    /// Create a media container for `unit` and return its creation id.
    ///
    /// The media type is `IMAGE` when the unit has an image URL and `TEXT`
    /// otherwise; a link attachment is only sent for `TEXT`.
    async fn create_container(&self, unit: &PostUnit) -> Result<String, ThreadsError>;

    /// Read the current processing status of a container.
    async fn container_status(&self, creation_id: &str) -> Result<ContainerState, ThreadsError>;

    /// Publish a ready container and return the published post id.
    async fn publish_container(&self, creation_id: &str) -> Result<String, ThreadsError>;
}
