//! Moderation state machine.
//!
//! ```text
//!   create ──▶ in-review ──approve──▶ approved
//!                  │                     │
//!                  └──────remove─────────┴──▶ (deleted)
//! ```

use std::sync::Arc;

use unswachh_store::{ReportFilter, ReportStore, StoreError};
use unswachh_types::{Report, ReportId, ReportStatus, Timestamp};

use crate::{AdminGate, ModerationError};

/// Proof of a successful admin login.
///
/// Only [`ModerationEngine::login`] can issue one; every moderation operation
/// takes it explicitly.
#[derive(Debug)]
pub struct AdminSession {
    issued_at: Timestamp,
}

impl AdminSession {
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }
}

/// Result of an approve request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproveOutcome {
    /// The report moved from in-review to approved.
    Approved,
    /// The report was already approved; nothing changed.
    AlreadyApproved,
}

/// The admin dashboard view: both queues, newest first.
#[derive(Clone, Debug, Default)]
pub struct ReviewQueue {
    pub in_review: Vec<Report>,
    pub approved: Vec<Report>,
}

pub struct ModerationEngine {
    gate: Arc<dyn AdminGate>,
    store: Arc<dyn ReportStore>,
}

fn map_store_error(id: &ReportId, e: StoreError) -> ModerationError {
    if e.is_not_found() {
        ModerationError::NotFound(*id)
    } else {
        ModerationError::PersistenceFailed(e.to_string())
    }
}

impl ModerationEngine {
    pub fn new(gate: Arc<dyn AdminGate>, store: Arc<dyn ReportStore>) -> Self {
        Self { gate, store }
    }

    /// Exchange a password for an admin session.
    pub async fn login(&self, password: &str) -> Result<AdminSession, ModerationError> {
        if password.is_empty() {
            tracing::warn!("admin login rejected: empty password");
            return Err(ModerationError::Unauthorized);
        }
        if !self.gate.verify(password).await {
            tracing::warn!("admin login rejected");
            return Err(ModerationError::Unauthorized);
        }
        tracing::info!("admin session opened");
        Ok(AdminSession {
            issued_at: Timestamp::now(),
        })
    }

    /// Make a report public. Approving an approved report is a no-op success.
    pub fn approve(
        &self,
        _session: &AdminSession,
        id: &ReportId,
    ) -> Result<ApproveOutcome, ModerationError> {
        let report = self.store.get(id).map_err(|e| map_store_error(id, e))?;
        if report.status == ReportStatus::Approved {
            tracing::debug!(report = %id, "approve: already approved");
            return Ok(ApproveOutcome::AlreadyApproved);
        }
        self.store
            .set_status(id, ReportStatus::Approved)
            .map_err(|e| map_store_error(id, e))?;
        tracing::info!(report = %id, "report approved");
        Ok(ApproveOutcome::Approved)
    }

    /// Permanently delete a report in any state.
    pub fn remove(&self, _session: &AdminSession, id: &ReportId) -> Result<(), ModerationError> {
        self.store.delete(id).map_err(|e| map_store_error(id, e))?;
        tracing::info!(report = %id, "report removed");
        Ok(())
    }

    /// Every report split by status, newest first.
    pub fn review_queue(&self, _session: &AdminSession) -> Result<ReviewQueue, ModerationError> {
        let mut all = self
            .store
            .list(ReportFilter::All)
            .map_err(|e| ModerationError::PersistenceFailed(e.to_string()))?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let (approved, in_review) = all
            .into_iter()
            .partition(|r| r.status == ReportStatus::Approved);
        Ok(ReviewQueue {
            in_review,
            approved,
        })
    }
}
