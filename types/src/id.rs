//! Opaque identities for reports and voters.

use crate::UnswachhError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 16-byte report identifier, assigned by the store at creation.
///
/// Rendered and serialized as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId([u8; 16]);

impl ReportId {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random identifier from the OS random source.
    pub fn generate() -> Result<Self, UnswachhError> {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes).map_err(|e| UnswachhError::Random(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ReportId {
    type Err = UnswachhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|_| UnswachhError::InvalidReportId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ReportId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The single implicit, unauthenticated identity of a voting device.
///
/// Nothing stops a device from discarding its identity and voting again;
/// the vote ledger treats that as an accepted limitation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Result<Self, UnswachhError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UnswachhError::InvalidVoterId(id));
        }
        Ok(Self(id))
    }

    /// Generate a random device identity.
    pub fn generate() -> Result<Self, UnswachhError> {
        let mut bytes = [0u8; 12];
        getrandom::getrandom(&mut bytes).map_err(|e| UnswachhError::Random(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_id_display_parse_roundtrip() {
        let id = ReportId::new([0xab; 16]);
        let parsed: ReportId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn report_id_rejects_short_hex() {
        assert!("abcd".parse::<ReportId>().is_err());
        assert!("zz".repeat(16).parse::<ReportId>().is_err());
    }

    #[test]
    fn generated_ids_differ() {
        let a = ReportId::generate().unwrap();
        let b = ReportId::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn voter_id_rejects_blank() {
        assert!(VoterId::new("   ").is_err());
        assert_eq!(VoterId::new("device-1").unwrap().as_str(), "device-1");
    }
}
