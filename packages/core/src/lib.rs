//! Pure-logic building blocks for publishing to Threads.
//!
//! This crate has no I/O. It decides how content is laid out as a thread;
//! the `threadpost-connector` crate drives the Graph API to publish it.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chunk`] | Word-boundary text splitting via [`split_text`] |
//! | [`types`] | [`ContentRequest`], [`PostUnit`], [`MediaType`], [`ContainerStatus`] |
//! | [`plan`] | Ordered thread layout via [`ContentPlan`] |
//!
//! # Quick start
//!
//! ```rust
//! use threadpost::{ContentPlan, ContentRequest, UnitRole};
//!
//! let request = ContentRequest::new(
//!     Some("A short announcement.".into()),
//!     None,
//!     Some("https://example.com/post".into()),
//! );
//! let plan = ContentPlan::build(&request).unwrap();
//!
//! let roles: Vec<_> = plan.units().iter().map(|u| u.role).collect();
//! assert_eq!(roles, vec![UnitRole::Chunk(0), UnitRole::LinkReply]);
//! ```

pub mod chunk;
pub mod plan;
pub mod types;

pub use chunk::{char_len, split_text, THREADS_CHAR_LIMIT};
pub use plan::{ContentPlan, PlannedUnit, UnitRole};
pub use types::{ContainerStatus, ContentError, ContentRequest, MediaType, PostUnit};
