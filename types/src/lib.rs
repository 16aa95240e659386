//! Fundamental types for the Unswachh report engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! coordinates, report and voter identities, timestamps, the report record itself,
//! and the moderation / vote state enums.

pub mod coordinate;
pub mod error;
pub mod id;
pub mod report;
pub mod state;
pub mod time;

pub use coordinate::Coordinate;
pub use error::UnswachhError;
pub use id::{ReportId, VoterId};
pub use report::Report;
pub use state::{ReportStatus, VoteChoice};
pub use time::Timestamp;
