//! Startup access-token check.
//!
//! Queries `debug_token` once at startup and logs what it finds. The result
//! never blocks startup: an invalid or unreadable token only produces a
//! warning, and publishing will surface the real error later.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::threads::{GraphClient, TokenInfo};

/// What the startup check concluded about the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Invalid,
    NeverExpires,
    Expires { at: DateTime<Utc>, days_left: i64 },
}

impl TokenStatus {
    /// Classify `info` relative to `now`.
    pub fn from_info(info: &TokenInfo, now: DateTime<Utc>) -> Self {
        if !info.is_valid {
            return TokenStatus::Invalid;
        }
        match (info.expires_at_utc(), info.days_remaining(now)) {
            (Some(at), Some(days_left)) => TokenStatus::Expires { at, days_left },
            _ => TokenStatus::NeverExpires,
        }
    }
}

/// Validate the configured token and log the outcome.
pub async fn report_token_status(client: &GraphClient) -> Option<TokenStatus> {
    let info = match client.validate_token().await {
        Ok(info) => info,
        Err(e) => {
            warn!("could not validate access token: {e}");
            return None;
        }
    };

    let status = TokenStatus::from_info(&info, Utc::now());
    match &status {
        TokenStatus::Invalid => warn!("access token is not valid"),
        TokenStatus::NeverExpires => info!("access token is valid and does not expire"),
        TokenStatus::Expires { at, days_left } => info!(
            "access token is valid, expires {} ({days_left} days left)",
            at.format("%Y-%m-%d")
        ),
    }
    Some(status)
}
