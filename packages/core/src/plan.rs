//! Content planning: turn a [`ContentRequest`] into the ordered list of posts
//! that make up a thread.
//!
//! The plan fixes *what* gets published and in which order. Reply linkage is
//! filled in at publish time, because each reply needs the id Threads assigned
//! to the post before it.
//!
//! Layout of a plan:
//!
//! 1. One unit per text chunk. Only the first chunk carries the image.
//! 2. If there is no text but there is an image, a single image-only unit.
//! 3. If there is an external URL, one trailing plain-text unit holding it:
//!    a reply to the last unit, or the root post when nothing else exists.

use crate::chunk::{split_text, THREADS_CHAR_LIMIT};
use crate::types::{ContentError, ContentRequest, PostUnit};

/// What a planned unit is, used to label progress and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRole {
    /// Text chunk at this zero-based position.
    Chunk(usize),
    /// Standalone image with no text.
    Image,
    /// External URL posted as a reply to the thread.
    LinkReply,
    /// External URL posted as the root, when there was nothing else.
    Link,
}

impl std::fmt::Display for UnitRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitRole::Chunk(i) => write!(f, "chunk {i}"),
            UnitRole::Image => write!(f, "image"),
            UnitRole::LinkReply => write!(f, "URL reply"),
            UnitRole::Link => write!(f, "URL"),
        }
    }
}

/// A unit of content before it has a place in the reply chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUnit {
    pub role: UnitRole,
    pub text: Option<String>,
    pub image_url: Option<String>,
}

impl PlannedUnit {
    /// `true` for the trailing external-URL unit.
    pub fn is_link(&self) -> bool {
        matches!(self.role, UnitRole::LinkReply | UnitRole::Link)
    }

    /// Attach this unit to the chain under `reply_to_id`.
    pub fn into_post(self, reply_to_id: Option<String>) -> PostUnit {
        PostUnit {
            text: self.text,
            image_url: self.image_url,
            reply_to_id,
            link_attachment: None,
        }
    }
}

/// The ordered units for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPlan {
    units: Vec<PlannedUnit>,
}

impl ContentPlan {
    /// Build the plan for `request`, chunking text at [`THREADS_CHAR_LIMIT`].
    pub fn build(request: &ContentRequest) -> Result<Self, ContentError> {
        Self::build_with_limit(request, THREADS_CHAR_LIMIT)
    }

    /// Build the plan with an explicit chunk limit.
    pub fn build_with_limit(request: &ContentRequest, limit: usize) -> Result<Self, ContentError> {
        request.validate()?;

        let chunks = request
            .text
            .as_deref()
            .map(|t| split_text(t, limit))
            .unwrap_or_default();

        let mut units: Vec<PlannedUnit> = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| PlannedUnit {
                role: UnitRole::Chunk(i),
                text: Some(chunk),
                image_url: if i == 0 { request.image_url.clone() } else { None },
            })
            .collect();

        if units.is_empty() {
            if let Some(image_url) = &request.image_url {
                units.push(PlannedUnit {
                    role: UnitRole::Image,
                    text: None,
                    image_url: Some(image_url.clone()),
                });
            }
        }

        if let Some(url) = &request.external_url {
            let role = if units.is_empty() {
                UnitRole::Link
            } else {
                UnitRole::LinkReply
            };
            units.push(PlannedUnit {
                role,
                text: Some(url.clone()),
                image_url: None,
            });
        }

        if units.is_empty() {
            return Err(ContentError::Empty);
        }

        Ok(Self { units })
    }

    pub fn units(&self) -> &[PlannedUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of text chunks in the plan.
    pub fn chunk_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.role, UnitRole::Chunk(_)))
            .count()
    }
}

impl IntoIterator for ContentPlan {
    type Item = PlannedUnit;
    type IntoIter = std::vec::IntoIter<PlannedUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}
