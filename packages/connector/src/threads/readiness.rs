//! Container readiness polling.
//!
//! A freshly created container is processed asynchronously by Threads;
//! publishing it before it reports `FINISHED` fails unpredictably. The loop
//! here polls the status endpoint on a fixed interval until the container is
//! ready, has failed, or the wall-clock deadline passes.
//!
//! | Status | Outcome |
//! |--------|---------|
//! | `FINISHED`, `PUBLISHED` | ready |
//! | `ERROR` | [`ThreadsError::ContainerFailed`] with the remote error message |
//! | `EXPIRED` | [`ThreadsError::ContainerFailed`] |
//! | anything else | keep polling |
//! | deadline passed | [`ThreadsError::ReadinessTimeout`] |

use std::time::Duration;

use threadpost::ContainerStatus;
use tracing::info;

use super::{ThreadsApi, ThreadsError};
use crate::clock::Clock;

/// Default delay between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default total time allowed for a container to become ready.
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Floor for the poll interval, so a zero setting cannot spin on the API.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How often to poll and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            deadline: READY_TIMEOUT,
        }
    }
}

/// Poll `creation_id` until it is ready to publish.
///
/// Returns the terminal ready status. Status request failures are returned
/// immediately; only "still processing" answers are retried.
pub async fn wait_until_ready(
    api: &dyn ThreadsApi,
    clock: &dyn Clock,
    creation_id: &str,
    policy: ReadinessPolicy,
) -> Result<ContainerStatus, ThreadsError> {
    let interval = policy.interval.max(MIN_POLL_INTERVAL);
    let started = clock.now();
    // Unrepresentable deadlines mean "no deadline".
    let deadline = started.checked_add(policy.deadline);

    loop {
        let state = api.container_status(creation_id).await?;
        info!("container {creation_id} status: {}", state.status);

        match state.status {
            status if status.is_ready() => return Ok(status),
            ContainerStatus::Error => {
                return Err(ThreadsError::ContainerFailed {
                    container_id: creation_id.to_string(),
                    status: ContainerStatus::Error,
                    reason: state
                        .error_message
                        .unwrap_or_else(|| "processing failed".to_string()),
                })
            }
            ContainerStatus::Expired => {
                return Err(ThreadsError::ContainerFailed {
                    container_id: creation_id.to_string(),
                    status: ContainerStatus::Expired,
                    reason: "expired before publishing".to_string(),
                })
            }
            _ => {}
        }

        clock.sleep(interval).await;
        let now = clock.now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            return Err(ThreadsError::ReadinessTimeout {
                container_id: creation_id.to_string(),
                waited: now - started,
            });
        }
    }
}
