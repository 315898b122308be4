//! [`GraphClient`]: the reqwest-backed [`ThreadsApi`] implementation.
//!
//! Endpoints used:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create container | `POST {base}/{user_id}/threads` (form) |
//! | container status | `GET {base}/{creation_id}?fields=status,error_message` |
//! | publish | `POST {base}/{user_id}/threads_publish` (form) |
//! | token diagnostics | `GET {base}/debug_token?input_token=...` |
//!
//! Every request carries the access token. Responses are decoded into one
//! record type per endpoint; a non-success status is turned into a
//! [`RemoteApiError`] from the Graph error envelope.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use threadpost::{ContainerStatus, PostUnit};
use tracing::{debug, info};

use super::{ContainerState, RemoteApiError, ThreadsApi, ThreadsError};
use crate::config::ConnectorConfig;

/// Production Graph API base URL.
pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.threads.net/v1.0";

/// Per-request timeout for outbound Graph API calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Response records
// ---------------------------------------------------------------------------

/// `{"id": "..."}` returned by container creation and publish.
#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

/// Body of the container status endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Graph API error envelope: `{"error": {...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error_subcode: Option<i64>,
    #[serde(default)]
    error_user_title: Option<String>,
    #[serde(default)]
    error_user_msg: Option<String>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DebugTokenResponse {
    data: TokenInfo,
}

/// Access token details from `debug_token`. Informational only.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    #[serde(default)]
    pub is_valid: bool,

    /// Unix seconds; `0` means the token does not expire.
    #[serde(default)]
    pub expires_at: i64,

    #[serde(default)]
    pub data_access_expires_at: i64,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub application: Option<String>,
}

impl TokenInfo {
    /// Expiry as a timestamp, or `None` for a non-expiring token.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        if self.expires_at <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Whole days from `now` until expiry (negative once expired).
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at_utc().map(|at| (at - now).num_days())
    }
}

impl RemoteApiError {
    /// Build from a non-success response, preferring the Graph error
    /// envelope and falling back to the raw body text.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let status_text = status.to_string();
        let raw = String::from_utf8_lossy(body).into_owned();

        match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) if !envelope.error.message.is_empty() => {
                let detail = envelope.error;
                Self {
                    status: status.as_u16(),
                    status_text,
                    message: detail.message,
                    user_title: detail.error_user_title.filter(|s| !s.is_empty()),
                    user_message: detail.error_user_msg.filter(|s| !s.is_empty()),
                    code: detail.code,
                    error_subcode: detail.error_subcode,
                    fbtrace_id: detail.fbtrace_id,
                }
            }
            _ => Self {
                status: status.as_u16(),
                status_text,
                message: raw,
                user_title: None,
                user_message: None,
                code: None,
                error_subcode: None,
                fbtrace_id: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// GraphClient
// ---------------------------------------------------------------------------

/// Threads Graph API client for a single user.
///
/// Holds a cloneable [`reqwest::Client`], which pools keep-alive connections
/// across requests.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    base: String,
    user_id: String,
    access_token: String,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base", &self.base)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Create a client from a pre-configured `reqwest::Client`.
    pub fn new(
        http: Client,
        base: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http,
            base,
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Build a client, including its HTTP transport, from connector config.
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ThreadsError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::new(
            http,
            &config.graph_api_base,
            &config.threads_user_id,
            &config.threads_access_token,
        ))
    }

    /// Inspect the configured access token via `debug_token`.
    pub async fn validate_token(&self) -> Result<TokenInfo, ThreadsError> {
        let url = format!("{}/debug_token", self.base);
        let request = self.http.get(&url).query(&[
            ("access_token", self.access_token.as_str()),
            ("input_token", self.access_token.as_str()),
        ]);
        let body = self.send(request, "debug token").await?;
        let response: DebugTokenResponse = decode("debug token", &body)?;
        Ok(response.data)
    }

    /// Send `request`, read the whole body, and map non-success statuses to
    /// [`ThreadsError::RemoteApi`].
    async fn send(
        &self,
        request: RequestBuilder,
        context: &'static str,
    ) -> Result<Vec<u8>, ThreadsError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        log_response(context, status, &body);

        if !status.is_success() {
            return Err(RemoteApiError::from_response(status, &body).into());
        }
        Ok(body)
    }
}

#[async_trait]
impl ThreadsApi for GraphClient {
    async fn create_container(&self, unit: &PostUnit) -> Result<String, ThreadsError> {
        let url = format!("{}/{}/threads", self.base, self.user_id);
        let media_type = unit.media_type();

        let mut form: Vec<(&str, &str)> = vec![
            ("access_token", self.access_token.as_str()),
            ("media_type", media_type.as_str()),
        ];
        if let Some(image_url) = unit.image_url.as_deref() {
            form.push(("image_url", image_url));
        }
        if let Some(text) = unit.text.as_deref().filter(|t| !t.is_empty()) {
            form.push(("text", text));
        }
        if let Some(reply_to_id) = unit.reply_to_id.as_deref() {
            form.push(("reply_to_id", reply_to_id));
        }
        let link_attachment = unit.effective_link_attachment();
        if let Some(link) = link_attachment {
            form.push(("link_attachment", link));
        }

        info!(
            "creating media container: type={media_type}, has_text={}, has_image={}, reply={}, has_link_attachment={}",
            unit.text.is_some(),
            unit.image_url.is_some(),
            unit.reply_to_id.is_some(),
            link_attachment.is_some(),
        );

        let body = self
            .send(self.http.post(&url).form(&form), "create container")
            .await?;
        let created: IdResponse = decode("create container", &body)?;
        Ok(created.id)
    }

    async fn container_status(&self, creation_id: &str) -> Result<ContainerState, ThreadsError> {
        let url = format!("{}/{}", self.base, creation_id);
        let request = self.http.get(&url).query(&[
            ("fields", "status,error_message"),
            ("access_token", self.access_token.as_str()),
        ]);

        let body = self.send(request, "container status").await?;
        let response: StatusResponse = decode("container status", &body)?;

        Ok(ContainerState {
            id: response.id.unwrap_or_else(|| creation_id.to_string()),
            status: ContainerStatus::parse(response.status.as_deref().unwrap_or("")),
            error_message: response.error_message.filter(|m| !m.is_empty()),
        })
    }

    async fn publish_container(&self, creation_id: &str) -> Result<String, ThreadsError> {
        let url = format!("{}/{}/threads_publish", self.base, self.user_id);
        let form = [
            ("creation_id", creation_id),
            ("access_token", self.access_token.as_str()),
        ];

        info!("publishing media container {creation_id}");

        let body = self
            .send(self.http.post(&url).form(&form), "publish")
            .await?;
        let published: IdResponse = decode("publish", &body)?;
        Ok(published.id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode<T: DeserializeOwned>(context: &'static str, body: &[u8]) -> Result<T, ThreadsError> {
    serde_json::from_slice(body).map_err(|source| ThreadsError::Decode { context, source })
}

/// Log a Graph API response. JSON bodies are re-serialised so non-ASCII
/// text shows up readable instead of `\uXXXX`-escaped.
fn log_response(context: &str, status: StatusCode, body: &[u8]) {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => debug!("graph api {context}: status={status} body={value}"),
        Err(_) => debug!(
            "graph api {context}: status={status} body={}",
            String::from_utf8_lossy(body)
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
