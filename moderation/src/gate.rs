//! Admin password gates.

use std::sync::Arc;

use async_trait::async_trait;
use unswachh_store::{MetaStore, ADMIN_PASSWORD_KEY};

/// Decides whether a password grants admin rights.
#[async_trait]
pub trait AdminGate: Send + Sync {
    async fn verify(&self, password: &str) -> bool;
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Gate with a password fixed at construction (config file or environment).
pub struct StaticPasswordGate {
    password: String,
}

impl StaticPasswordGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

#[async_trait]
impl AdminGate for StaticPasswordGate {
    async fn verify(&self, password: &str) -> bool {
        !self.password.is_empty()
            && constant_time_eq(self.password.as_bytes(), password.as_bytes())
    }
}

/// Gate that reads the password from the `admin.password` setting on every check.
///
/// An unset setting, or a store that cannot be read, rejects every password.
pub struct StoredPasswordGate {
    meta: Arc<dyn MetaStore>,
}

impl StoredPasswordGate {
    pub fn new(meta: Arc<dyn MetaStore>) -> Self {
        Self { meta }
    }
}

#[async_trait]
impl AdminGate for StoredPasswordGate {
    async fn verify(&self, password: &str) -> bool {
        match self.meta.get_setting(ADMIN_PASSWORD_KEY) {
            Ok(Some(stored)) if !stored.is_empty() => {
                constant_time_eq(stored.as_bytes(), password.as_bytes())
            }
            Ok(_) => {
                tracing::warn!("no admin password configured; rejecting login");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read admin password");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unswachh_nullables::NullMetaStore;

    #[test]
    fn constant_time_eq_matches_plain_equality() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[tokio::test]
    async fn static_gate() {
        let gate = StaticPasswordGate::new("swachh");
        assert!(gate.verify("swachh").await);
        assert!(!gate.verify("Swachh").await);
    }

    #[tokio::test]
    async fn empty_static_password_opens_nothing() {
        let gate = StaticPasswordGate::new("");
        assert!(!gate.verify("").await);
    }

    #[tokio::test]
    async fn stored_gate_follows_setting() {
        let meta = Arc::new(NullMetaStore::new());
        let gate = StoredPasswordGate::new(meta.clone());
        assert!(!gate.verify("secret").await);

        meta.put_setting(ADMIN_PASSWORD_KEY, "secret").unwrap();
        assert!(gate.verify("secret").await);
        assert!(!gate.verify("wrong").await);

        meta.put_setting(ADMIN_PASSWORD_KEY, "rotated").unwrap();
        assert!(!gate.verify("secret").await);
    }
}
