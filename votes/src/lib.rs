//! Community voting on approved reports.
//!
//! The [`VoteLedger`] is the only component that changes a report's vote
//! counter. It remembers each voter's last choice per report in a
//! [`VoteRecordStore`] so that repeating a vote is a no-op and switching
//! sides moves the counter by two.

pub mod error;
pub mod ledger;
pub mod record;

pub use error::VoteError;
pub use ledger::{VoteEffect, VoteKind, VoteLedger};
pub use record::{InMemoryVoteRecords, JsonFileVoteRecords, VoteRecordStore};
