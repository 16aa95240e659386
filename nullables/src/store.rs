//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use unswachh_store::{MetaStore, NewReport, ReportFilter, ReportStore, StoreError};
use unswachh_types::{Report, ReportId, ReportStatus, Timestamp};

use crate::NullClock;

/// A report store operation that can be scripted to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Get,
    List,
    SetStatus,
    IncrementVotes,
    Delete,
}

struct Reports {
    by_id: BTreeMap<ReportId, Report>,
    last_created_at: Timestamp,
    next_id: u64,
}

/// An in-memory report store for testing.
///
/// Ids are sequential and creation times come from a [`NullClock`], so test
/// output is reproducible. Every mutation happens under one lock, which
/// makes vote increments atomic.
pub struct NullReportStore {
    reports: Mutex<Reports>,
    clock: Arc<NullClock>,
    failing: Mutex<HashSet<StoreOp>>,
}

impl NullReportStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::default()))
    }

    pub fn with_clock(clock: Arc<NullClock>) -> Self {
        Self {
            reports: Mutex::new(Reports {
                by_id: BTreeMap::new(),
                last_created_at: Timestamp::EPOCH,
                next_id: 1,
            }),
            clock,
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make `op` fail with a backend error until [`recover`](Self::recover) is called.
    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Backend(format!("{:?} scripted to fail", op)));
        }
        Ok(())
    }
}

impl Default for NullReportStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &ReportId) -> StoreError {
    StoreError::NotFound(format!("report {}", id))
}

impl ReportStore for NullReportStore {
    fn create(&self, new: NewReport) -> Result<Report, StoreError> {
        self.check(StoreOp::Create)?;
        let mut reports = self.reports.lock().unwrap();

        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&reports.next_id.to_be_bytes());
        reports.next_id += 1;

        let created_at = self.clock.now().monotonic_after(reports.last_created_at);
        reports.last_created_at = created_at;

        let report = Report {
            id: ReportId::new(bytes),
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            location_name: new.location_name,
            location: new.location,
            status: ReportStatus::InReview,
            votes: 0,
            created_at,
            external_link: new.external_link,
        };
        reports.by_id.insert(report.id, report.clone());
        Ok(report)
    }

    fn get(&self, id: &ReportId) -> Result<Report, StoreError> {
        self.check(StoreOp::Get)?;
        self.reports
            .lock()
            .unwrap()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        self.check(StoreOp::List)?;
        let mut result: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .by_id
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    fn set_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError> {
        self.check(StoreOp::SetStatus)?;
        let mut reports = self.reports.lock().unwrap();
        let report = reports.by_id.get_mut(id).ok_or_else(|| not_found(id))?;
        if !report.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition(format!(
                "report {}: {} -> {}",
                id, report.status, status
            )));
        }
        report.status = status;
        Ok(report.clone())
    }

    fn increment_votes(&self, id: &ReportId, delta: i64) -> Result<i64, StoreError> {
        self.check(StoreOp::IncrementVotes)?;
        let mut reports = self.reports.lock().unwrap();
        let report = reports.by_id.get_mut(id).ok_or_else(|| not_found(id))?;
        report.votes = report.votes.saturating_add(delta);
        Ok(report.votes)
    }

    fn delete(&self, id: &ReportId) -> Result<(), StoreError> {
        self.check(StoreOp::Delete)?;
        self.reports
            .lock()
            .unwrap()
            .by_id
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

/// An in-memory settings and counters store for testing.
pub struct NullMetaStore {
    settings: Mutex<HashMap<String, String>>,
    counters: Mutex<HashMap<String, u64>>,
    schema_version: Mutex<u32>,
}

impl NullMetaStore {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
            schema_version: Mutex::new(0),
        }
    }
}

impl Default for NullMetaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaStore for NullMetaStore {
    fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.settings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.settings.lock().unwrap().get(key).cloned())
    }

    fn delete_setting(&self, key: &str) -> Result<(), StoreError> {
        self.settings.lock().unwrap().remove(key);
        Ok(())
    }

    fn increment_counter(&self, name: &str, by: u64) -> Result<u64, StoreError> {
        let mut counters = self.counters.lock().unwrap();
        let value = counters.entry(name.to_string()).or_insert(0);
        *value = value.saturating_add(by);
        Ok(*value)
    }

    fn get_counter(&self, name: &str) -> Result<u64, StoreError> {
        Ok(self.counters.lock().unwrap().get(name).copied().unwrap_or(0))
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        Ok(*self.schema_version.lock().unwrap())
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        *self.schema_version.lock().unwrap() = version;
        Ok(())
    }
}
