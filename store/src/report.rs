//! Report storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use unswachh_types::{Coordinate, Report, ReportId, ReportStatus};

/// Fields supplied by the submitter. Identity, status, vote count and
/// creation time are assigned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub location_name: String,
    pub location: Coordinate,
    pub external_link: Option<String>,
}

/// Which reports a query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportFilter {
    /// Every stored report, whatever its status.
    All,
    /// Only reports in the given status.
    Status(ReportStatus),
}

impl ReportFilter {
    pub fn approved() -> Self {
        Self::Status(ReportStatus::Approved)
    }

    pub fn in_review() -> Self {
        Self::Status(ReportStatus::InReview)
    }

    pub fn matches(&self, report: &Report) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => report.status == *status,
        }
    }
}

/// Trait for the persisted collection of reports.
///
/// Status and vote count are only ever changed through [`set_status`] and
/// [`increment_votes`]; there is no whole-record update.
///
/// [`set_status`]: ReportStore::set_status
/// [`increment_votes`]: ReportStore::increment_votes
pub trait ReportStore: Send + Sync {
    /// Persist a new report in state in-review with zero votes.
    ///
    /// Assigns a fresh id and a creation timestamp strictly greater than
    /// any previously assigned by this store.
    fn create(&self, new: NewReport) -> Result<Report, StoreError>;

    /// Get a report by id.
    fn get(&self, id: &ReportId) -> Result<Report, StoreError>;

    /// Reports matching `filter`, oldest first.
    fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError>;

    /// Move a report to `status` and return the updated report.
    ///
    /// Fails with [`StoreError::InvalidTransition`] when the stored status
    /// cannot move to `status` (an approved report never goes back to review).
    fn set_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError>;

    /// Atomically add `delta` to the vote counter and return the new count.
    ///
    /// Implementations must apply the delta in one atomic step against the
    /// stored value (never a read-modify-write across separate operations),
    /// so that concurrent increments from different voters all land.
    fn increment_votes(&self, id: &ReportId, delta: i64) -> Result<i64, StoreError>;

    /// Permanently remove a report.
    fn delete(&self, id: &ReportId) -> Result<(), StoreError>;

    /// Whether a report with this id exists.
    fn exists(&self, id: &ReportId) -> Result<bool, StoreError> {
        match self.get(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
