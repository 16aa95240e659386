//! Settings and counters storage trait.

use crate::StoreError;

/// Setting holding the admin password checked by the stored password gate.
pub const ADMIN_PASSWORD_KEY: &str = "admin.password";

/// Counter of public site visits.
pub const VIEWS_COUNTER: &str = "views";

/// Trait for small pieces of state that don't belong to any report:
/// string settings, named counters and the schema version.
pub trait MetaStore: Send + Sync {
    /// Store a setting value.
    fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Retrieve a setting value, `None` if unset.
    fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete a setting.
    fn delete_setting(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically add `by` to a named counter (created at zero) and return the new value.
    fn increment_counter(&self, name: &str, by: u64) -> Result<u64, StoreError>;

    /// Current value of a named counter, zero if it was never incremented.
    fn get_counter(&self, name: &str) -> Result<u64, StoreError>;

    /// Get the current database schema version.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    /// Set the database schema version.
    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
