//! Per-voter memory of the last choice made on each report.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use unswachh_store::StoreError;
use unswachh_types::{ReportId, VoteChoice, VoterId};

/// Storage for `(voter, report) -> choice`. At most one record per pair.
pub trait VoteRecordStore: Send + Sync {
    fn get(&self, voter: &VoterId, report: &ReportId) -> Result<Option<VoteChoice>, StoreError>;

    /// Insert or overwrite the record for this pair.
    fn put(&self, voter: &VoterId, report: &ReportId, choice: VoteChoice)
        -> Result<(), StoreError>;

    /// Forget every record of `voter`.
    fn clear(&self, voter: &VoterId) -> Result<(), StoreError>;
}

/// Vote records held in memory only.
#[derive(Default)]
pub struct InMemoryVoteRecords {
    records: Mutex<HashMap<(VoterId, ReportId), VoteChoice>>,
}

impl InMemoryVoteRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoteRecordStore for InMemoryVoteRecords {
    fn get(&self, voter: &VoterId, report: &ReportId) -> Result<Option<VoteChoice>, StoreError> {
        Ok(lock(&self.records).get(&(voter.clone(), *report)).copied())
    }

    fn put(
        &self,
        voter: &VoterId,
        report: &ReportId,
        choice: VoteChoice,
    ) -> Result<(), StoreError> {
        lock(&self.records).insert((voter.clone(), *report), choice);
        Ok(())
    }

    fn clear(&self, voter: &VoterId) -> Result<(), StoreError> {
        lock(&self.records).retain(|(v, _), _| v != voter);
        Ok(())
    }
}

/// Writers replace whole entries, so a map behind a poisoned lock is still
/// consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// voter id -> report id (hex) -> choice
type VoteMap = BTreeMap<String, BTreeMap<String, VoteChoice>>;

/// Vote records in a single JSON file on the device.
///
/// The whole map is kept in memory and the file is rewritten on every change
/// through a temporary sibling and a rename, so a crash leaves either the old
/// or the new contents.
pub struct JsonFileVoteRecords {
    path: PathBuf,
    votes: Mutex<VoteMap>,
}

impl JsonFileVoteRecords {
    /// Load records from `path`. A missing file is an empty record set.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let votes = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Corruption(format!("vote file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VoteMap::new(),
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            votes: Mutex::new(votes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, votes: &VoteMap) -> Result<(), StoreError> {
        let json =
            serde_json::to_vec_pretty(votes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        let io = |e: std::io::Error| StoreError::Backend(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io)?;
            }
        }
        let mut file = std::fs::File::create(&tmp).map_err(io)?;
        file.write_all(&json).map_err(io)?;
        file.sync_all().map_err(io)?;
        std::fs::rename(&tmp, &self.path).map_err(io)?;
        Ok(())
    }
}

impl VoteRecordStore for JsonFileVoteRecords {
    fn get(&self, voter: &VoterId, report: &ReportId) -> Result<Option<VoteChoice>, StoreError> {
        Ok(lock(&self.votes)
            .get(voter.as_str())
            .and_then(|m| m.get(&report.to_string()))
            .copied())
    }

    fn put(
        &self,
        voter: &VoterId,
        report: &ReportId,
        choice: VoteChoice,
    ) -> Result<(), StoreError> {
        let mut votes = lock(&self.votes);
        let mut next = votes.clone();
        next.entry(voter.as_str().to_string())
            .or_default()
            .insert(report.to_string(), choice);
        self.persist(&next)?;
        *votes = next;
        Ok(())
    }

    fn clear(&self, voter: &VoterId) -> Result<(), StoreError> {
        let mut votes = lock(&self.votes);
        let mut next = votes.clone();
        if next.remove(voter.as_str()).is_none() {
            return Ok(());
        }
        self.persist(&next)?;
        *votes = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(name: &str) -> VoterId {
        VoterId::new(name).unwrap()
    }

    #[test]
    fn records_stay_usable_after_a_panicking_holder() {
        let records = std::sync::Arc::new(InMemoryVoteRecords::new());
        let report = ReportId::new([4; 16]);
        records.put(&voter("a"), &report, VoteChoice::Up).unwrap();

        let poisoner = std::sync::Arc::clone(&records);
        let joined = std::thread::spawn(move || {
            let _held = poisoner.records.lock().unwrap();
            panic!("holder died");
        })
        .join();
        assert!(joined.is_err());
        assert!(records.records.is_poisoned());

        assert_eq!(
            records.get(&voter("a"), &report).unwrap(),
            Some(VoteChoice::Up)
        );
        records.put(&voter("b"), &report, VoteChoice::Down).unwrap();
        assert_eq!(
            records.get(&voter("b"), &report).unwrap(),
            Some(VoteChoice::Down)
        );
    }

    #[test]
    fn in_memory_overwrites_and_clears() {
        let records = InMemoryVoteRecords::new();
        let (v, r) = (voter("device-a"), ReportId::new([1; 16]));
        assert_eq!(records.get(&v, &r).unwrap(), None);
        records.put(&v, &r, VoteChoice::Up).unwrap();
        records.put(&v, &r, VoteChoice::Down).unwrap();
        assert_eq!(records.get(&v, &r).unwrap(), Some(VoteChoice::Down));
        records.clear(&v).unwrap();
        assert_eq!(records.get(&v, &r).unwrap(), None);
    }

    #[test]
    fn json_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.json");
        let (v, r) = (voter("device-a"), ReportId::new([2; 16]));
        {
            let records = JsonFileVoteRecords::open(&path).unwrap();
            records.put(&v, &r, VoteChoice::Up).unwrap();
        }
        let records = JsonFileVoteRecords::open(&path).unwrap();
        assert_eq!(records.get(&v, &r).unwrap(), Some(VoteChoice::Up));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_file_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.json");
        let records = JsonFileVoteRecords::open(&path).unwrap();
        let r = ReportId::new([3; 16]);
        records.put(&voter("d"), &r, VoteChoice::Down).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["d"][r.to_string()], "down");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            JsonFileVoteRecords::open(&path),
            Err(StoreError::Corruption(_))
        ));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("votes.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let records = JsonFileVoteRecords {
            path: path.clone(),
            votes: Mutex::new(VoteMap::new()),
        };
        let (v, r) = (voter("d"), ReportId::new([4; 16]));
        assert!(records.put(&v, &r, VoteChoice::Up).is_err());
        assert_eq!(records.get(&v, &r).unwrap(), None);
    }
}
