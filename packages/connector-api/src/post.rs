//! Publishing request and response bodies.

use serde::{Deserialize, Serialize};
use threadpost::ContentRequest;

/// Body of `POST /threads/post`.
///
/// All fields are optional on the wire; the connector requires at least
/// `text` or `image_url`.
///
/// ```json
/// {
///   "text": "Long-form announcement that may span several posts...",
///   "image_url": "https://cdn.example.com/cover.jpg",
///   "url": "https://example.com/announcement"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Publicly reachable image; attached to the first post only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// External link, published as the final reply in the thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PostRequest {
    /// `true` when the request has text or an image, the minimum the
    /// endpoint accepts.
    pub fn has_primary_content(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.text) || filled(&self.image_url)
    }
}

impl From<PostRequest> for ContentRequest {
    fn from(req: PostRequest) -> Self {
        ContentRequest::new(req.text, req.image_url, req.url)
    }
}

/// Successful response: the id of the root post of the published thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostResponse {
    pub post_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialise_as_none() {
        let req: PostRequest = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("hello"));
        assert_eq!(req.image_url, None);
        assert_eq!(req.url, None);
    }

    #[test]
    fn url_alone_is_not_primary_content() {
        let req = PostRequest {
            url: Some("https://example.com".into()),
            ..Default::default()
        };
        assert!(!req.has_primary_content());

        let blank = PostRequest {
            text: Some("   ".into()),
            ..Default::default()
        };
        assert!(!blank.has_primary_content());
    }

    #[test]
    fn converts_to_content_request() {
        let req = PostRequest {
            text: Some("hi".into()),
            image_url: Some(String::new()),
            url: Some("https://example.com".into()),
        };
        let content: ContentRequest = req.into();
        assert_eq!(content.text.as_deref(), Some("hi"));
        assert_eq!(content.image_url, None);
        assert_eq!(content.external_url.as_deref(), Some("https://example.com"));
    }
}
