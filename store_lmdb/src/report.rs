//! LMDB implementation of ReportStore.
//!
//! Records are keyed by the 16 raw id bytes and stored bincode-encoded.
//! Creation timestamps are kept strictly increasing by persisting the last
//! assigned value in the meta database inside the same write transaction.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn, RwTxn};

use unswachh_store::{NewReport, ReportFilter, ReportStore, StoreError};
use unswachh_types::{Report, ReportId, ReportStatus, Timestamp};

use crate::LmdbError;

const LAST_CREATED_AT_KEY: &[u8] = b"last_created_at";

pub struct LmdbReportStore {
    pub(crate) env: Arc<Env>,
    pub(crate) reports_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbReportStore {
    fn read(&self, rtxn: &RoTxn, id: &ReportId) -> Result<Report, LmdbError> {
        let bytes = self
            .reports_db
            .get(rtxn, id.as_bytes())?
            .ok_or_else(|| LmdbError::NotFound(format!("report {}", id)))?;
        Ok(bincode::deserialize(bytes)?)
    }

    fn write(&self, wtxn: &mut RwTxn, report: &Report) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(report)?;
        self.reports_db.put(wtxn, report.id.as_bytes(), &bytes)?;
        Ok(())
    }

    fn last_created_at(&self, rtxn: &RoTxn) -> Result<Timestamp, LmdbError> {
        match self.meta_db.get(rtxn, LAST_CREATED_AT_KEY)? {
            Some(bytes) if bytes.len() == 8 => {
                let arr: [u8; 8] = bytes.try_into().expect("checked length");
                Ok(Timestamp::new(u64::from_le_bytes(arr)))
            }
            Some(_) => Err(LmdbError::Serialization(
                "last_created_at has unexpected byte length".to_string(),
            )),
            None => Ok(Timestamp::EPOCH),
        }
    }

    /// Apply `update` to the stored record inside one write transaction.
    fn modify<T>(
        &self,
        id: &ReportId,
        update: impl FnOnce(&mut Report) -> T,
    ) -> Result<(Report, T), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let mut report = self.read(&wtxn, id)?;
        let out = update(&mut report);
        self.write(&mut wtxn, &report)?;
        wtxn.commit()?;
        Ok((report, out))
    }
}

impl ReportStore for LmdbReportStore {
    fn create(&self, new: NewReport) -> Result<Report, StoreError> {
        let id = ReportId::generate().map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .reports_db
            .get(&wtxn, id.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("report {}", id)));
        }

        let created_at = Timestamp::now().monotonic_after(self.last_created_at(&wtxn)?);
        let report = Report {
            id,
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

        self.write(&mut wtxn, &report)?;
        self.meta_db
            .put(
                &mut wtxn,
                LAST_CREATED_AT_KEY,
                &created_at.as_millis().to_le_bytes(),
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(report = %report.id, created_at = %report.created_at, "report created");
        Ok(report)
    }

    fn get(&self, id: &ReportId) -> Result<Report, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read(&rtxn, id)?)
    }

    fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.reports_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut result = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            let report: Report = bincode::deserialize(val).map_err(LmdbError::from)?;
            if filter.matches(&report) {
                result.push(report);
            }
        }
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    fn set_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut report = self.read(&wtxn, id)?;
        if !report.status.can_transition_to(status) {
            // Dropping the transaction aborts it.
            return Err(StoreError::InvalidTransition(format!(
                "report {}: {} -> {}",
                id, report.status, status
            )));
        }
        report.status = status;
        self.write(&mut wtxn, &report)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(report)
    }

    fn increment_votes(&self, id: &ReportId, delta: i64) -> Result<i64, StoreError> {
        // LMDB allows one writer at a time, so the read and the write below
        // cannot interleave with another increment.
        let (_, votes) = self.modify(id, |r| {
            r.votes = r.votes.saturating_add(delta);
            r.votes
        })?;
        Ok(votes)
    }

    fn delete(&self, id: &ReportId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existed = self
            .reports_db
            .delete(&mut wtxn, id.as_bytes())
            .map_err(LmdbError::from)?;
        if !existed {
            return Err(LmdbError::NotFound(format!("report {}", id)).into());
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
