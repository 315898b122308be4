//! Connector configuration, populated from environment variables.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::publisher::PublishTiming;
use crate::threads::client::{DEFAULT_GRAPH_API_BASE, DEFAULT_HTTP_TIMEOUT};
use crate::threads::readiness::ReadinessPolicy;

/// Upper bound for every `*_SECS` timing variable (one day).
pub const MAX_TIMING_SECS: u64 = 86_400;

/// Errors raised while reading configuration. All of them are fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the connector.
///
/// Built once at startup and handed to the Graph client, the publisher, and
/// the router. Nothing reads the environment after that.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `THREADS_USER_ID` | required | Threads user the posts are published as |
/// | `THREADS_ACCESS_TOKEN` | required | Graph API access token |
/// | `API_KEY` | required | Expected value of the inbound `X-API-Key` header |
/// | `PORT` | `8080` | TCP port to listen on (all interfaces) |
/// | `THREADS_API_BASE` | `https://graph.threads.net/v1.0` | Graph API base URL |
/// | `THREADS_POLL_INTERVAL_SECS` | `2` | Seconds between container status polls |
/// | `THREADS_READY_TIMEOUT_SECS` | `30` | Seconds to wait for a container to be ready |
/// | `THREADS_PUBLISH_DELAY_SECS` | `1` | Pause after each published chunk |
/// | `THREADS_LINK_REPLY_DELAY_SECS` | `5` | Pause before the trailing URL reply |
/// | `THREADS_HTTP_TIMEOUT_SECS` | `60` | Timeout for each outbound Graph API request |
#[derive(Clone)]
pub struct ConnectorConfig {
    pub threads_user_id: String,
    pub threads_access_token: String,
    pub api_key: String,
    pub bind_addr: SocketAddr,
    /// Graph API base URL without a trailing slash.
    pub graph_api_base: String,
    pub timing: PublishTiming,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("threads_user_id", &self.threads_user_id)
            .field("threads_access_token", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("graph_api_base", &self.graph_api_base)
            .field("timing", &self.timing)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl ConnectorConfig {
    /// Populate config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let threads_user_id = required("THREADS_USER_ID")?;
        let threads_access_token = required("THREADS_ACCESS_TOKEN")?;
        let api_key = required("API_KEY")?;

        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let graph_api_base = lookup("THREADS_API_BASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let defaults = PublishTiming::default();
        let secs = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            let value: u64 = parse_or(&lookup, var, default.as_secs())?;
            if value > MAX_TIMING_SECS {
                return Err(ConfigError::Invalid {
                    var,
                    value: value.to_string(),
                    reason: format!("must be at most {MAX_TIMING_SECS} seconds"),
                });
            }
            Ok(Duration::from_secs(value))
        };

        let timing = PublishTiming {
            readiness: ReadinessPolicy {
                interval: secs("THREADS_POLL_INTERVAL_SECS", defaults.readiness.interval)?,
                deadline: secs("THREADS_READY_TIMEOUT_SECS", defaults.readiness.deadline)?,
            },
            publish_delay: secs("THREADS_PUBLISH_DELAY_SECS", defaults.publish_delay)?,
            link_reply_delay: secs("THREADS_LINK_REPLY_DELAY_SECS", defaults.link_reply_delay)?,
        };

        let http_timeout = secs("THREADS_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT)?;

        Ok(Self {
            threads_user_id,
            threads_access_token,
            api_key,
            bind_addr,
            graph_api_base,
            timing,
            http_timeout,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}
