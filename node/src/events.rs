//! Change events emitted by the report store, for feed subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;

use unswachh_store::{NewReport, ReportFilter, ReportStore, StoreError};
use unswachh_types::{Report, ReportId, ReportStatus};

/// A committed change to the report collection.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportEvent {
    Created(Report),
    StatusChanged { id: ReportId, status: ReportStatus },
    VotesChanged { id: ReportId, votes: i64 },
    Deleted(ReportId),
}

impl ReportEvent {
    pub fn report_id(&self) -> ReportId {
        match self {
            Self::Created(r) => r.id,
            Self::StatusChanged { id, .. }
            | Self::VotesChanged { id, .. }
            | Self::Deleted(id) => *id,
        }
    }
}

/// [`ReportStore`] decorator that publishes a [`ReportEvent`] after every
/// successful write. Reads pass straight through.
pub struct EventedStore {
    inner: Arc<dyn ReportStore>,
    tx: broadcast::Sender<ReportEvent>,
}

impl EventedStore {
    pub fn new(inner: Arc<dyn ReportStore>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { inner, tx }
    }

    pub fn sender(&self) -> broadcast::Sender<ReportEvent> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: ReportEvent) {
        // No receivers is not an error: nobody is watching.
        let _ = self.tx.send(event);
    }
}

impl ReportStore for EventedStore {
    fn create(&self, new: NewReport) -> Result<Report, StoreError> {
        let report = self.inner.create(new)?;
        self.publish(ReportEvent::Created(report.clone()));
        Ok(report)
    }

    fn get(&self, id: &ReportId) -> Result<Report, StoreError> {
        self.inner.get(id)
    }

    fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        self.inner.list(filter)
    }

    fn set_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError> {
        let report = self.inner.set_status(id, status)?;
        self.publish(ReportEvent::StatusChanged { id: *id, status });
        Ok(report)
    }

    fn increment_votes(&self, id: &ReportId, delta: i64) -> Result<i64, StoreError> {
        let votes = self.inner.increment_votes(id, delta)?;
        self.publish(ReportEvent::VotesChanged { id: *id, votes });
        Ok(votes)
    }

    fn delete(&self, id: &ReportId) -> Result<(), StoreError> {
        self.inner.delete(id)?;
        self.publish(ReportEvent::Deleted(*id));
        Ok(())
    }
}
