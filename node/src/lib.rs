//! Unswachh node: wires the report lifecycle engines to storage and the
//! outside world.
//!
//! The node owns:
//! - The report store (LMDB or in-memory), wrapped so every write is published
//! - Location verification, the submission pipeline and moderation
//! - The vote ledger and this device's vote records
//! - The live report feed
//! - Prometheus metrics and logging setup

pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod logging;
pub mod metrics;
pub mod node;

pub use config::NodeConfig;
pub use error::NodeError;
pub use events::{EventedStore, ReportEvent};
pub use feed::{FeedSubscription, ReportFeed};
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::{Collaborators, NoPositioning, NodeStats, ReportLinks, UnswachhNode};
