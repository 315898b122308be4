//! In-memory [`ThreadsApi`] for unit tests.
//!
//! Records every call in order, hands out predictable ids (`c1`, `c2`, ...
//! for containers, `post-c1`, ... for published posts), replays a queue of
//! container statuses (defaulting to `FINISHED` once the queue is empty), and
//! can be told to fail the N-th create or publish call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use threadpost::{ContainerStatus, PostUnit};

use super::{ContainerState, RemoteApiError, ThreadsApi, ThreadsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create(PostUnit),
    Status(String),
    Publish(String),
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    calls: Mutex<Vec<Call>>,
    statuses: Mutex<VecDeque<(ContainerStatus, Option<String>)>>,
    fail_create_at: Option<usize>,
    fail_status_at: Option<usize>,
    fail_publish_at: Option<usize>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue status responses, consumed one per status call.
    pub(crate) fn with_statuses<I>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = ContainerStatus>,
    {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(|s| (s, None)));
        self
    }

    /// Queue one `ERROR` status carrying `message`.
    pub(crate) fn with_error_status(self, message: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back((ContainerStatus::Error, Some(message.to_string())));
        self
    }

    /// Fail the create call with this zero-based index.
    pub(crate) fn failing_create_at(mut self, index: usize) -> Self {
        self.fail_create_at = Some(index);
        self
    }

    /// Fail the status call with this zero-based index.
    pub(crate) fn failing_status_at(mut self, index: usize) -> Self {
        self.fail_status_at = Some(index);
        self
    }

    /// Fail the publish call with this zero-based index.
    pub(crate) fn failing_publish_at(mut self, index: usize) -> Self {
        self.fail_publish_at = Some(index);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn created_units(&self) -> Vec<PostUnit> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(unit) => Some(unit),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn create_count(&self) -> usize {
        self.created_units().len()
    }

    pub(crate) fn status_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Status(_)))
            .count()
    }

    pub(crate) fn publish_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Publish(_)))
            .count()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let index = calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(&call))
            .count();
        calls.push(call);
        index
    }
}

pub(crate) fn remote_error(message: &str) -> ThreadsError {
    ThreadsError::RemoteApi(RemoteApiError {
        status: 400,
        status_text: "400 Bad Request".into(),
        message: message.into(),
        user_title: None,
        user_message: None,
        code: Some(100),
        error_subcode: None,
        fbtrace_id: None,
    })
}

#[async_trait]
impl ThreadsApi for ScriptedApi {
    async fn create_container(&self, unit: &PostUnit) -> Result<String, ThreadsError> {
        let index = self.record(Call::Create(unit.clone()));
        if self.fail_create_at == Some(index) {
            return Err(remote_error("create rejected"));
        }
        Ok(format!("c{}", index + 1))
    }

    async fn container_status(&self, creation_id: &str) -> Result<ContainerState, ThreadsError> {
        let index = self.record(Call::Status(creation_id.to_string()));
        if self.fail_status_at == Some(index) {
            return Err(remote_error("status unavailable"));
        }
        let (status, error_message) = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((ContainerStatus::Finished, None));
        Ok(ContainerState {
            id: creation_id.to_string(),
            status,
            error_message,
        })
    }

    async fn publish_container(&self, creation_id: &str) -> Result<String, ThreadsError> {
        let index = self.record(Call::Publish(creation_id.to_string()));
        if self.fail_publish_at == Some(index) {
            return Err(remote_error("publish rejected"));
        }
        Ok(format!("post-{creation_id}"))
    }
}
