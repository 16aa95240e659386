//! Abstract storage traits for the Unswachh report engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod meta;
pub mod report;

pub use error::StoreError;
pub use meta::{MetaStore, ADMIN_PASSWORD_KEY, VIEWS_COUNTER};
pub use report::{NewReport, ReportFilter, ReportStore};
