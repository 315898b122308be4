//! Request and response types for the threadpost connector HTTP API.
//!
//! Shared by the connector itself, the `threadpost` CLI, and the
//! end-to-end tests, so all three agree on the wire format.
//!
//! # Endpoints covered
//!
//! | Method | Path | Auth | Type |
//! |--------|------|------|------|
//! | POST | `/threads/post` | `X-API-Key` | [`PostRequest`] → [`PostResponse`] |
//! | GET | `/health` | none | → `OK` |
//!
//! Every error response carries an [`ErrorResponse`] body.

pub mod error;
pub mod post;

pub use error::ErrorResponse;
pub use post::{PostRequest, PostResponse};

/// Header carrying the shared API key on authenticated requests.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Path of the publishing endpoint.
pub const POST_PATH: &str = "/threads/post";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";
