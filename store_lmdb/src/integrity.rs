//! Startup integrity checks.
//!
//! Run before the node starts serving so that a damaged data directory is
//! reported instead of surfacing later as failed submissions.

use heed::types::Bytes;
use unswachh_types::Report;

use crate::environment::{COUNTERS_DB, META_DB, REPORTS_DB};
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub reports_decoded: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

const EXPECTED_DATABASES: &[&str] = &[REPORTS_DB, META_DB, COUNTERS_DB];

/// Open each expected database, count its entries and decode every report.
///
/// Read failures are collected in the returned report rather than aborting.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env().read_txn()?;

    for &db_name in EXPECTED_DATABASES {
        match env.env().open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    for entry in env.reports_db.iter(&rtxn)? {
        let (key, val) = entry?;
        match bincode::deserialize::<Report>(val) {
            Ok(r) if r.id.as_bytes().as_slice() == key => report.reports_decoded += 1,
            Ok(r) => report
                .errors
                .push(format!("report {} stored under a foreign key", r.id)),
            Err(e) => report
                .errors
                .push(format!("undecodable report record: {}", e)),
        }
    }

    Ok(report)
}
