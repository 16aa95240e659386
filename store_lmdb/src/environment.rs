//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{LmdbError, LmdbMetaStore, LmdbReportStore};

/// Named databases created in every environment.
pub(crate) const REPORTS_DB: &str = "reports";
pub(crate) const META_DB: &str = "meta";
pub(crate) const COUNTERS_DB: &str = "counters";

/// Default maximum map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Default number of named databases reserved in the environment.
pub const DEFAULT_MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    path: PathBuf,
    env: Arc<Env>,
    pub(crate) reports_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) counters_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The directory is created if missing. All named databases are created
    /// in a single write transaction.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process per path; the
        // node never opens the same directory twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let reports_db = env.create_database(&mut wtxn, Some(REPORTS_DB))?;
        let meta_db = env.create_database(&mut wtxn, Some(META_DB))?;
        let counters_db = env.create_database(&mut wtxn, Some(COUNTERS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, max_dbs, "opened LMDB environment");

        Ok(Self {
            path: path.to_path_buf(),
            env: Arc::new(env),
            reports_db,
            meta_db,
            counters_db,
        })
    }

    /// Open with the default map size and database count.
    pub fn open_default(path: &Path) -> Result<Self, LmdbError> {
        Self::open(path, DEFAULT_MAX_DBS, DEFAULT_MAP_SIZE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Report store backed by this environment.
    pub fn report_store(&self) -> LmdbReportStore {
        LmdbReportStore {
            env: Arc::clone(&self.env),
            reports_db: self.reports_db,
            meta_db: self.meta_db,
        }
    }

    /// Settings and counters store backed by this environment.
    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
            counters_db: self.counters_db,
        }
    }

    /// Flush dirty pages to disk.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}
