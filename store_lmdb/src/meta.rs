//! LMDB implementation of MetaStore.
//!
//! Settings live in the `meta` database under a `setting:` prefix so they
//! can never collide with internal keys. Counters live in their own database
//! as little-endian `u64` values.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use unswachh_store::{MetaStore, StoreError};

use crate::LmdbError;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const SETTING_PREFIX: &str = "setting:";

pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) counters_db: Database<Bytes, Bytes>,
}

fn setting_key(key: &str) -> Vec<u8> {
    format!("{}{}", SETTING_PREFIX, key).into_bytes()
}

impl LmdbMetaStore {
    fn read_counter(&self, rtxn: &RoTxn, name: &str) -> Result<u64, LmdbError> {
        match self.counters_db.get(rtxn, name.as_bytes())? {
            Some(bytes) if bytes.len() == 8 => {
                let arr: [u8; 8] = bytes.try_into().expect("checked length");
                Ok(u64::from_le_bytes(arr))
            }
            Some(_) => Err(LmdbError::Serialization(format!(
                "counter '{}' has unexpected byte length",
                name
            ))),
            None => Ok(0),
        }
    }
}

impl MetaStore for LmdbMetaStore {
    fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, &setting_key(key), value.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .meta_db
            .get(&rtxn, &setting_key(key))
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    LmdbError::Serialization(format!("setting '{}' is not UTF-8: {}", key, e))
                })?;
                Ok(Some(s.to_string()))
            }
            None => Ok(None),
        }
    }

    fn delete_setting(&self, key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .delete(&mut wtxn, &setting_key(key))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn increment_counter(&self, name: &str, by: u64) -> Result<u64, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let value = self.read_counter(&wtxn, name)?.saturating_add(by);
        self.counters_db
            .put(&mut wtxn, name.as_bytes(), &value.to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(value)
    }

    fn get_counter(&self, name: &str) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_counter(&rtxn, name)?)
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .meta_db
            .get(&rtxn, SCHEMA_VERSION_KEY)
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) if bytes.len() == 4 => {
                let arr: [u8; 4] = bytes.try_into().expect("checked length");
                Ok(u32::from_le_bytes(arr))
            }
            Some(_) => Err(LmdbError::Serialization(
                "schema_version has unexpected byte length".to_string(),
            ))?,
            None => Ok(0),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        let bytes = version.to_le_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, SCHEMA_VERSION_KEY, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use unswachh_store::{ADMIN_PASSWORD_KEY, VIEWS_COUNTER};

    fn open() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    #[test]
    fn settings_put_get_delete() {
        let (_dir, env) = open();
        let meta = env.meta_store();
        assert_eq!(meta.get_setting(ADMIN_PASSWORD_KEY).unwrap(), None);
        meta.put_setting(ADMIN_PASSWORD_KEY, "hunter2").unwrap();
        assert_eq!(
            meta.get_setting(ADMIN_PASSWORD_KEY).unwrap().as_deref(),
            Some("hunter2")
        );
        meta.delete_setting(ADMIN_PASSWORD_KEY).unwrap();
        assert_eq!(meta.get_setting(ADMIN_PASSWORD_KEY).unwrap(), None);
    }

    #[test]
    fn setting_named_like_internal_key_does_not_clobber_schema_version() {
        let (_dir, env) = open();
        let meta = env.meta_store();
        meta.set_schema_version(1).unwrap();
        meta.put_setting("schema_version", "garbage").unwrap();
        assert_eq!(meta.get_schema_version().unwrap(), 1);
    }

    #[test]
    fn counters_start_at_zero_and_increment() {
        let (_dir, env) = open();
        let meta = env.meta_store();
        assert_eq!(meta.get_counter(VIEWS_COUNTER).unwrap(), 0);
        assert_eq!(meta.increment_counter(VIEWS_COUNTER, 1).unwrap(), 1);
        assert_eq!(meta.increment_counter(VIEWS_COUNTER, 4).unwrap(), 5);
        assert_eq!(meta.get_counter(VIEWS_COUNTER).unwrap(), 5);
    }

    #[test]
    fn schema_version_defaults_to_zero() {
        let (_dir, env) = open();
        let meta = env.meta_store();
        assert_eq!(meta.get_schema_version().unwrap(), 0);
        meta.set_schema_version(3).unwrap();
        assert_eq!(meta.get_schema_version().unwrap(), 3);
    }
}
