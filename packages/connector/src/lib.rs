//! Public surface for the `threadpost-connector` crate.
//!
//! Re-exports what an embedder needs to run the connector in-process: the
//! router builder, config, publisher, and Graph API client. The conformance
//! suite uses this instead of launching the binary.

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod publisher;
pub mod router;
pub mod threads;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, ConnectorConfig};
pub use publisher::{PublishError, PublishTiming, Publisher};
pub use router::build_router;
pub use threads::{GraphClient, ThreadsApi, ThreadsError};
