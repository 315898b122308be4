//! Content and container types shared by the planner and the connector.
//!
//! [`ContentRequest`] is what a caller asks to publish, [`PostUnit`] is one
//! post actually sent to Threads, and [`ContainerStatus`] is the lifecycle
//! state the Graph API reports for a not-yet-published container.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating caller-supplied content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// None of text, image URL, or external URL carried anything.
    #[error("no content to post: text, image_url, and url are all empty")]
    Empty,
}

/// A request to publish content as a Threads post or thread.
///
/// Empty or whitespace-only strings are normalised to `None` by
/// [`ContentRequest::new`], so `Some(_)` always means real content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRequest {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
}

impl ContentRequest {
    pub fn new(
        text: Option<String>,
        image_url: Option<String>,
        external_url: Option<String>,
    ) -> Self {
        Self {
            text: non_blank(text),
            image_url: non_blank(image_url),
            external_url: non_blank(external_url),
        }
    }

    /// Returns `true` when there is nothing at all to publish.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image_url.is_none() && self.external_url.is_none()
    }

    /// Reject a request that carries no content.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Media type of a Threads container.
///
/// Serialises as the uppercase Graph API value (`"TEXT"`, `"IMAGE"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Text,
    Image,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "TEXT",
            MediaType::Image => "IMAGE",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One post to be created, awaited, and published.
///
/// Every unit after the first in a thread carries the previously published
/// post id in `reply_to_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUnit {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub reply_to_id: Option<String>,
    /// URL rendered as a preview card. Ignored for image posts.
    pub link_attachment: Option<String>,
}

impl PostUnit {
    /// `IMAGE` when an image URL is attached, `TEXT` otherwise.
    pub fn media_type(&self) -> MediaType {
        if self.image_url.is_some() {
            MediaType::Image
        } else {
            MediaType::Text
        }
    }

    /// The link attachment, only when the media type allows one.
    pub fn effective_link_attachment(&self) -> Option<&str> {
        match self.media_type() {
            MediaType::Text => self.link_attachment.as_deref(),
            MediaType::Image => None,
        }
    }
}

/// Lifecycle state of a remote container, as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    InProgress,
    Finished,
    Published,
    Error,
    Expired,
    /// Any status string Threads sends that is not listed above.
    Unknown(String),
}

impl ContainerStatus {
    /// Parse the Graph API status string. Never fails; unrecognised values
    /// become [`ContainerStatus::Unknown`].
    pub fn parse(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => ContainerStatus::InProgress,
            "FINISHED" => ContainerStatus::Finished,
            "PUBLISHED" => ContainerStatus::Published,
            "ERROR" => ContainerStatus::Error,
            "EXPIRED" => ContainerStatus::Expired,
            other => ContainerStatus::Unknown(other.to_string()),
        }
    }

    /// The container can be published (or already was).
    pub fn is_ready(&self) -> bool {
        matches!(self, ContainerStatus::Finished | ContainerStatus::Published)
    }

    /// The container will never become publishable.
    pub fn is_failed(&self) -> bool {
        matches!(self, ContainerStatus::Error | ContainerStatus::Expired)
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::InProgress => write!(f, "IN_PROGRESS"),
            ContainerStatus::Finished => write!(f, "FINISHED"),
            ContainerStatus::Published => write!(f, "PUBLISHED"),
            ContainerStatus::Error => write!(f, "ERROR"),
            ContainerStatus::Expired => write!(f, "EXPIRED"),
            ContainerStatus::Unknown(s) if s.is_empty() => write!(f, "<empty>"),
            ContainerStatus::Unknown(s) => write!(f, "{s}"),
        }
    }
}
