//! The vote ledger.
//!
//! | prior record | new choice | delta  | kind           |
//! |--------------|------------|--------|----------------|
//! | none         | up / down  | +1/-1  | `Cast`         |
//! | same         | same       | 0      | `AlreadyVoted` |
//! | opposite     | up / down  | +2/-2  | `Flipped`      |

use std::sync::{Arc, Mutex, PoisonError};

use unswachh_store::ReportStore;
use unswachh_types::{ReportId, VoteChoice, VoterId};

use crate::{VoteError, VoteRecordStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteKind {
    /// First vote by this voter on this report.
    Cast,
    /// Same choice as the recorded one; nothing changed.
    AlreadyVoted,
    /// Switched from the opposite choice.
    Flipped,
}

/// What a cast did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteEffect {
    pub kind: VoteKind,
    pub choice: VoteChoice,
    /// Signed change applied to the counter.
    pub delta: i64,
    /// Counter value after the cast.
    pub votes: i64,
}

impl VoteEffect {
    pub fn changed(&self) -> bool {
        self.delta != 0
    }
}

/// Delta and kind for casting `choice` over `prior`.
pub fn vote_delta(prior: Option<VoteChoice>, choice: VoteChoice) -> (i64, VoteKind) {
    match prior {
        None => (choice.unit_delta(), VoteKind::Cast),
        Some(p) if p == choice => (0, VoteKind::AlreadyVoted),
        Some(_) => (2 * choice.unit_delta(), VoteKind::Flipped),
    }
}

pub struct VoteLedger {
    store: Arc<dyn ReportStore>,
    records: Arc<dyn VoteRecordStore>,
    // Serializes casts so two rapid taps cannot both see "no prior record".
    cast_lock: Mutex<()>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn ReportStore>, records: Arc<dyn VoteRecordStore>) -> Self {
        Self {
            store,
            records,
            cast_lock: Mutex::new(()),
        }
    }

    /// Cast `choice` on an approved report.
    ///
    /// The counter is changed first, through the store's atomic increment.
    /// The voter's record is written only once that succeeded; if writing the
    /// record then fails, the increment is reversed.
    pub fn cast_vote(
        &self,
        voter: &VoterId,
        report_id: &ReportId,
        choice: VoteChoice,
    ) -> Result<VoteEffect, VoteError> {
        // The lock guards no data, so a poisoned one is safe to reuse.
        let _guard = self.cast_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let report = self.store.get(report_id).map_err(|e| {
            if e.is_not_found() {
                VoteError::ReportNotFound(*report_id)
            } else {
                VoteError::Store(e.to_string())
            }
        })?;
        if !report.status.accepts_votes() {
            return Err(VoteError::NotVotable(*report_id));
        }

        let prior = self
            .records
            .get(voter, report_id)
            .map_err(|e| VoteError::Store(e.to_string()))?;
        let (delta, kind) = vote_delta(prior, choice);

        if delta == 0 {
            tracing::debug!(report = %report_id, %choice, "vote repeated; nothing to do");
            return Ok(VoteEffect {
                kind,
                choice,
                delta,
                votes: report.votes,
            });
        }

        let votes = self
            .store
            .increment_votes(report_id, delta)
            .map_err(|e| {
                if e.is_not_found() {
                    VoteError::ReportNotFound(*report_id)
                } else {
                    VoteError::Store(e.to_string())
                }
            })?;

        if let Err(e) = self.records.put(voter, report_id, choice) {
            tracing::warn!(
                report = %report_id,
                error = %e,
                "vote record not saved; reverting counter"
            );
            if let Err(undo) = self.store.increment_votes(report_id, -delta) {
                tracing::error!(
                    report = %report_id,
                    delta,
                    error = %undo,
                    "counter compensation failed"
                );
                return Err(VoteError::Store(format!(
                    "{}; compensation also failed: {}",
                    e, undo
                )));
            }
            return Err(VoteError::Store(e.to_string()));
        }

        tracing::info!(report = %report_id, %choice, delta, votes, ?kind, "vote applied");
        Ok(VoteEffect {
            kind,
            choice,
            delta,
            votes,
        })
    }

    /// The choice this voter last made on the report, for display.
    pub fn current_choice(
        &self,
        voter: &VoterId,
        report_id: &ReportId,
    ) -> Result<Option<VoteChoice>, VoteError> {
        self.records
            .get(voter, report_id)
            .map_err(|e| VoteError::Store(e.to_string()))
    }
}
