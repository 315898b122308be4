//! Thread publishing: drives a [`ContentPlan`] through Threads one post at a
//! time.
//!
//! For every planned unit the publisher runs
//! create container → wait until ready → publish, then links the next unit
//! to the id it just got back. The flow is strictly sequential because each
//! reply needs its parent's published id.
//!
//! # Failure semantics
//!
//! The first failing step aborts the whole sequence. Posts published before
//! the failure stay live on Threads; nothing is rolled back. The returned
//! [`PublishError::Step`] names the stage and unit that failed and lists the
//! ids that were already published.

use std::sync::Arc;
use std::time::Duration;

use threadpost::{ContentError, ContentPlan, ContentRequest, PostUnit, UnitRole, THREADS_CHAR_LIMIT};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::threads::{wait_until_ready, ReadinessPolicy, ThreadsApi, ThreadsError};

/// Pause after each published text chunk, to keep replies ordered and stay
/// clear of rate limits.
pub const PUBLISH_DELAY: Duration = Duration::from_secs(1);

/// Pause before posting the trailing URL reply, so the parent post has
/// propagated on Threads before it is replied to.
pub const LINK_REPLY_DELAY: Duration = Duration::from_secs(5);

/// Delays and polling limits used while publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTiming {
    pub readiness: ReadinessPolicy,
    pub publish_delay: Duration,
    pub link_reply_delay: Duration,
}

impl Default for PublishTiming {
    fn default() -> Self {
        Self {
            readiness: ReadinessPolicy::default(),
            publish_delay: PUBLISH_DELAY,
            link_reply_delay: LINK_REPLY_DELAY,
        }
    }
}

/// The step of the create → ready → publish cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    CreateContainer,
    AwaitReady,
    Publish,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStage::CreateContainer => write!(f, "create media container"),
            PublishStage::AwaitReady => write!(f, "wait for container readiness"),
            PublishStage::Publish => write!(f, "publish"),
        }
    }
}

/// Errors returned by [`Publisher::create_post`].
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Text, image URL, and external URL were all empty. No remote call was made.
    #[error("no content to post")]
    EmptyContent,

    /// A remote step failed part-way through the thread.
    #[error("failed to {stage} for {unit}: {source}")]
    Step {
        stage: PublishStage,
        unit: UnitRole,
        #[source]
        source: ThreadsError,
        /// Ids published before the failure. These remain live.
        published: Vec<String>,
    },
}

impl From<ContentError> for PublishError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Empty => PublishError::EmptyContent,
        }
    }
}

/// Publishes content as a Threads post or reply-chained thread.
///
/// Holds no per-request state, so one instance is shared by all concurrent
/// requests.
pub struct Publisher {
    api: Arc<dyn ThreadsApi>,
    clock: Arc<dyn Clock>,
    timing: PublishTiming,
    char_limit: usize,
}

impl Publisher {
    pub fn new(api: Arc<dyn ThreadsApi>, clock: Arc<dyn Clock>, timing: PublishTiming) -> Self {
        Self {
            api,
            clock,
            timing,
            char_limit: THREADS_CHAR_LIMIT,
        }
    }

    /// Override the per-post character limit used for chunking.
    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    /// Publish `request` and return the id of the root post.
    ///
    /// 1. Text is chunked; the image rides on the first chunk only.
    /// 2. Without text, an image is published on its own.
    /// 3. Each chunk after the first replies to the one before it.
    /// 4. An external URL is appended as a final plain-text reply (or is
    ///    the root post when there is nothing else).
    pub async fn create_post(&self, request: &ContentRequest) -> Result<String, PublishError> {
        let plan = ContentPlan::build_with_limit(request, self.char_limit)?;

        info!(
            "publishing {} post(s): chunks={}, image={}, url={}",
            plan.len(),
            plan.chunk_count(),
            request.image_url.is_some(),
            request.external_url.is_some(),
        );

        let mut root: Option<String> = None;
        let mut previous: Option<String> = None;
        let mut published: Vec<String> = Vec::with_capacity(plan.len());

        for planned in plan {
            let role = planned.role;

            if planned.is_link() && previous.is_some() {
                info!(
                    "waiting {}s before creating URL reply",
                    self.timing.link_reply_delay.as_secs()
                );
                self.clock.sleep(self.timing.link_reply_delay).await;
            }

            let unit = planned.into_post(previous.clone());
            let id = match self.publish_unit(&unit).await {
                Ok(id) => id,
                Err((stage, source)) => {
                    if !published.is_empty() {
                        warn!(
                            "{role} failed after {} post(s) went live: {}",
                            published.len(),
                            published.join(", ")
                        );
                    }
                    return Err(PublishError::Step {
                        stage,
                        unit: role,
                        source,
                        published,
                    });
                }
            };

            info!("{role} published: {id}");

            if matches!(role, UnitRole::Chunk(_)) {
                self.clock.sleep(self.timing.publish_delay).await;
            }

            root.get_or_insert_with(|| id.clone());
            previous = Some(id.clone());
            published.push(id);
        }

        root.ok_or(PublishError::EmptyContent)
    }

    /// Create, await, and publish a single unit.
    async fn publish_unit(&self, unit: &PostUnit) -> Result<String, (PublishStage, ThreadsError)> {
        let creation_id = self
            .api
            .create_container(unit)
            .await
            .map_err(|e| (PublishStage::CreateContainer, e))?;

        wait_until_ready(
            self.api.as_ref(),
            self.clock.as_ref(),
            &creation_id,
            self.timing.readiness,
        )
        .await
        .map_err(|e| (PublishStage::AwaitReady, e))?;

        self.api
            .publish_container(&creation_id)
            .await
            .map_err(|e| (PublishStage::Publish, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadpost::{ContainerStatus, MediaType};

    use crate::clock::ManualClock;
    use crate::threads::mock::{Call, ScriptedApi};

    fn publisher(api: &Arc<ScriptedApi>, clock: &Arc<ManualClock>) -> Publisher {
        Publisher::new(
            Arc::clone(api) as Arc<dyn ThreadsApi>,
            Arc::clone(clock) as Arc<dyn Clock>,
            PublishTiming::default(),
        )
    }

    fn request(text: &str, image: &str, url: &str) -> ContentRequest {
        ContentRequest::new(Some(text.into()), Some(image.into()), Some(url.into()))
    }

    #[tokio::test]
    async fn empty_request_makes_no_remote_calls() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let err = publisher(&api, &clock)
            .create_post(&request("", "", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::EmptyContent));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn single_chunk_runs_create_poll_publish_in_order() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .create_post(&request("hello threads", "", ""))
            .await
            .unwrap();

        assert_eq!(root, "post-c1");
        assert_eq!(
            api.calls(),
            vec![
                Call::Create(PostUnit {
                    text: Some("hello threads".into()),
                    ..Default::default()
                }),
                Call::Status("c1".into()),
                Call::Publish("c1".into()),
            ]
        );
        assert_eq!(clock.sleeps(), vec![PUBLISH_DELAY]);
    }

    #[tokio::test]
    async fn image_only_publishes_one_image_post() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .create_post(&request("", "https://cdn.example.com/a.jpg", ""))
            .await
            .unwrap();

        assert_eq!(root, "post-c1");
        let units = api.created_units();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].media_type(), MediaType::Image);
        assert_eq!(units[0].text, None);
        assert_eq!(units[0].reply_to_id, None);
        assert_eq!(api.publish_count(), 1);
    }

    #[tokio::test]
    async fn three_chunks_with_image_form_a_reply_chain() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .with_char_limit(10)
            .create_post(&request(
                "first one second two third",
                "https://cdn.example.com/a.jpg",
                "",
            ))
            .await
            .unwrap();

        let units = api.created_units();
        assert_eq!(units.len(), 3);

        assert_eq!(units[0].text.as_deref(), Some("first one"));
        assert_eq!(units[0].image_url.as_deref(), Some("https://cdn.example.com/a.jpg"));
        assert_eq!(units[0].reply_to_id, None);

        assert_eq!(units[1].image_url, None);
        assert_eq!(units[1].reply_to_id.as_deref(), Some("post-c1"));

        assert_eq!(units[2].image_url, None);
        assert_eq!(units[2].reply_to_id.as_deref(), Some("post-c2"));

        assert_eq!(root, "post-c1");
        assert_eq!(clock.sleeps(), vec![PUBLISH_DELAY; 3]);
    }

    #[tokio::test]
    async fn url_is_appended_as_final_reply() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .with_char_limit(10)
            .create_post(&request("alpha beta gamma", "", "https://example.com/x"))
            .await
            .unwrap();

        let units = api.created_units();
        assert_eq!(units.len(), 3);
        let link = &units[2];
        assert_eq!(link.text.as_deref(), Some("https://example.com/x"));
        assert_eq!(link.reply_to_id.as_deref(), Some("post-c2"));
        assert_eq!(link.media_type(), MediaType::Text);
        assert_eq!(link.link_attachment, None);

        assert_eq!(root, "post-c1", "root must be the first post, not the URL reply");
        assert_eq!(
            clock.sleeps(),
            vec![PUBLISH_DELAY, PUBLISH_DELAY, LINK_REPLY_DELAY]
        );
    }

    #[tokio::test]
    async fn url_alone_becomes_the_root_post() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .create_post(&request("", "", "https://example.com/x"))
            .await
            .unwrap();

        assert_eq!(root, "post-c1");
        let units = api.created_units();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].reply_to_id, None);
        assert!(clock.sleeps().is_empty(), "no parent, so no propagation delay");
    }

    #[tokio::test]
    async fn image_and_url_without_text() {
        let api = Arc::new(ScriptedApi::new());
        let clock = Arc::new(ManualClock::new());

        let root = publisher(&api, &clock)
            .create_post(&request("", "https://cdn.example.com/a.jpg", "https://e.com"))
            .await
            .unwrap();

        let units = api.created_units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].media_type(), MediaType::Image);
        assert_eq!(units[1].reply_to_id.as_deref(), Some("post-c1"));
        assert_eq!(root, "post-c1");
        assert_eq!(clock.sleeps(), vec![LINK_REPLY_DELAY]);
    }

    #[tokio::test]
    async fn failure_at_chunk_two_aborts_rest_without_rollback() {
        let api = Arc::new(ScriptedApi::new().failing_create_at(2));
        let clock = Arc::new(ManualClock::new());

        let err = publisher(&api, &clock)
            .with_char_limit(5)
            .create_post(&request("aaaa bbbb cccc dddd", "", ""))
            .await
            .unwrap_err();

        // Chunks 0 and 1 went through; chunk 2 failed at create; chunk 3 never started.
        assert_eq!(api.create_count(), 3);
        assert_eq!(api.publish_count(), 2);

        match &err {
            PublishError::Step {
                stage,
                unit,
                source,
                published,
            } => {
                assert_eq!(*stage, PublishStage::CreateContainer);
                assert_eq!(*unit, UnitRole::Chunk(2));
                assert!(matches!(source, ThreadsError::RemoteApi(_)));
                assert_eq!(published, &vec!["post-c1".to_string(), "post-c2".to_string()]);
            }
            other => panic!("expected Step error, got {other:?}"),
        }
        assert!(err
            .to_string()
            .starts_with("failed to create media container for chunk 2: API error: 400"));
    }

    #[tokio::test]
    async fn publish_failure_is_labelled() {
        let api = Arc::new(ScriptedApi::new().failing_publish_at(0));
        let clock = Arc::new(ManualClock::new());

        let err = publisher(&api, &clock)
            .create_post(&request("hi", "", "https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Step {
                stage: PublishStage::Publish,
                unit: UnitRole::Chunk(0),
                ..
            }
        ));
        // The URL reply is never attempted.
        assert_eq!(api.create_count(), 1);
    }

    #[tokio::test]
    async fn container_error_during_url_reply_is_labelled() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_statuses([ContainerStatus::Finished])
                .with_error_status("link could not be processed"),
        );
        let clock = Arc::new(ManualClock::new());

        let err = publisher(&api, &clock)
            .create_post(&request("hi", "", "https://example.com"))
            .await
            .unwrap_err();

        match err {
            PublishError::Step {
                stage,
                unit,
                published,
                ..
            } => {
                assert_eq!(stage, PublishStage::AwaitReady);
                assert_eq!(unit, UnitRole::LinkReply);
                assert_eq!(published, vec!["post-c1".to_string()]);
            }
            other => panic!("expected Step error, got {other:?}"),
        }
        assert_eq!(api.publish_count(), 1);
    }

    #[tokio::test]
    async fn status_request_failure_aborts_before_publish() {
        let api = Arc::new(ScriptedApi::new().failing_status_at(0));
        let clock = Arc::new(ManualClock::new());

        let err = publisher(&api, &clock)
            .create_post(&request("hi", "", ""))
            .await
            .unwrap_err();

        match err {
            PublishError::Step {
                stage,
                unit,
                source,
                published,
            } => {
                assert_eq!(stage, PublishStage::AwaitReady);
                assert_eq!(unit, UnitRole::Chunk(0));
                assert!(matches!(source, ThreadsError::RemoteApi(_)));
                assert!(published.is_empty());
            }
            other => panic!("expected Step error, got {other:?}"),
        }
        assert_eq!(api.status_count(), 1);
        assert_eq!(api.publish_count(), 0);
    }

    #[tokio::test]
    async fn slow_container_waits_before_publish() {
        let api = Arc::new(ScriptedApi::new().with_statuses([
            ContainerStatus::InProgress,
            ContainerStatus::InProgress,
            ContainerStatus::Finished,
        ]));
        let clock = Arc::new(ManualClock::new());

        publisher(&api, &clock)
            .create_post(&request("hi", "", ""))
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls.last(), Some(&Call::Publish("c1".into())));
    }
}
