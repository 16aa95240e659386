//! The report record.

use crate::{Coordinate, ReportId, ReportStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Placeholder label when the geocoder had nothing to say about a location.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Placeholder label when the geocoder could not be reached.
pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";

/// A persisted civic cleanliness report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Assigned by the store at creation, never changes.
    pub id: ReportId,
    pub title: String,
    pub description: Option<String>,
    /// Handle returned by the image upload (usually a URL).
    pub image_url: String,
    /// Human-readable place label, possibly a placeholder.
    pub location_name: String,
    pub location: Coordinate,
    pub status: ReportStatus,
    /// Sum of every vote delta applied so far. May be negative.
    pub votes: i64,
    /// Store-assigned creation time, strictly increasing per store.
    pub created_at: Timestamp,
    /// Optional link for sharing the report elsewhere.
    pub external_link: Option<String>,
}

impl Report {
    /// The location label, or [`UNKNOWN_LOCATION`] if it is blank.
    pub fn display_location(&self) -> &str {
        if self.location_name.trim().is_empty() {
            UNKNOWN_LOCATION
        } else {
            &self.location_name
        }
    }
}
