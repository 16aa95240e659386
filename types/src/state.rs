//! State enums for reports and votes.

use crate::UnswachhError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The moderation state of a report.
///
/// Deletion is not a state: a deleted report ceases to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    /// Submitted, waiting for an admin decision. Not shown publicly.
    InReview,
    /// Accepted by an admin. Shown on the public map and open for votes.
    Approved,
}

impl ReportStatus {
    /// Whether a stored report may move from this state to `next`.
    ///
    /// Reports only move forward: in-review to approved. Staying put is allowed.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (Self::InReview, _) | (Self::Approved, Self::Approved)
        )
    }

    /// Whether reports in this state accept votes.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InReview => "in-review",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = UnswachhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-review" => Ok(Self::InReview),
            "approved" => Ok(Self::Approved),
            other => Err(UnswachhError::InvalidStatus(other.to_string())),
        }
    }
}

/// A voter's choice on a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Up,
    Down,
}

impl VoteChoice {
    /// The counter change for a first vote with this choice.
    pub fn unit_delta(&self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = UnswachhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(UnswachhError::InvalidVoteChoice(s.to_string())),
        }
    }
}
