//! Proximity-based duplicate detection.

use crate::distance::distance_m;
use unswachh_types::{Coordinate, Report};

/// Reports closer than this many meters to an existing one are rejected.
pub const DUPLICATE_RADIUS_M: f64 = 50.0;

/// Blocks a new report that lies within the duplicate radius of any
/// existing report, whatever that report's status.
///
/// The check is a full scan. It is not isolated from concurrent submissions:
/// two candidates at the same spot arriving together can both pass.
#[derive(Clone, Copy, Debug)]
pub struct DuplicateGuard {
    radius_m: f64,
}

impl DuplicateGuard {
    pub fn new() -> Self {
        Self {
            radius_m: DUPLICATE_RADIUS_M,
        }
    }

    /// A guard with a custom radius (exclusive bound, meters).
    pub fn with_radius(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Whether `candidate` is strictly closer than the radius to any report.
    pub fn is_duplicate(&self, candidate: &Coordinate, existing: &[Report]) -> bool {
        self.find_nearby(candidate, existing).is_some()
    }

    /// The first report strictly inside the radius, if any.
    pub fn find_nearby<'a>(
        &self,
        candidate: &Coordinate,
        existing: &'a [Report],
    ) -> Option<&'a Report> {
        existing
            .iter()
            .find(|report| distance_m(candidate, &report.location) < self.radius_m)
    }
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unswachh_types::{ReportId, ReportStatus, Timestamp};

    fn report_at(seed: u8, lat: f64, lon: f64, status: ReportStatus) -> Report {
        Report {
            id: ReportId::new([seed; 16]),
            title: format!("report {seed}"),
            description: None,
            image_url: "https://img.example/1.jpg".to_string(),
            location_name: "Somewhere".to_string(),
            location: Coordinate::new(lat, lon).unwrap(),
            status,
            votes: 0,
            created_at: Timestamp::new(seed as u64),
            external_link: None,
        }
    }

    #[test]
    fn blocks_candidate_33m_from_existing() {
        let existing = vec![report_at(1, 12.9716, 77.5949, ReportStatus::Approved)];
        let candidate = Coordinate::new(12.9716, 77.5946).unwrap();
        assert!(DuplicateGuard::new().is_duplicate(&candidate, &existing));
    }

    #[test]
    fn in_review_reports_also_block() {
        let existing = vec![report_at(1, 12.9716, 77.5949, ReportStatus::InReview)];
        let candidate = Coordinate::new(12.9716, 77.5946).unwrap();
        assert!(DuplicateGuard::new().is_duplicate(&candidate, &existing));
    }

    #[test]
    fn passes_candidate_5km_away() {
        let existing = vec![
            report_at(1, 12.9716, 77.5946, ReportStatus::Approved),
            report_at(2, 12.9720, 77.5950, ReportStatus::InReview),
        ];
        let candidate = Coordinate::new(13.0166, 77.5946).unwrap();
        assert!(!DuplicateGuard::new().is_duplicate(&candidate, &existing));
    }

    #[test]
    fn radius_is_exclusive() {
        let existing = vec![report_at(1, 12.9716, 77.5949, ReportStatus::Approved)];
        let candidate = Coordinate::new(12.9716, 77.5946).unwrap();
        let d = distance_m(&candidate, &existing[0].location);

        assert!(!DuplicateGuard::with_radius(d).is_duplicate(&candidate, &existing));
        assert!(DuplicateGuard::with_radius(d + 1e-6).is_duplicate(&candidate, &existing));
    }

    #[test]
    fn find_nearby_returns_first_match() {
        let existing = vec![
            report_at(1, 40.0, 10.0, ReportStatus::Approved),
            report_at(2, 12.9716, 77.5947, ReportStatus::InReview),
            report_at(3, 12.9716, 77.5948, ReportStatus::Approved),
        ];
        let candidate = Coordinate::new(12.9716, 77.5946).unwrap();
        let hit = DuplicateGuard::new().find_nearby(&candidate, &existing).unwrap();
        assert_eq!(hit.id, ReportId::new([2; 16]));
    }

    #[test]
    fn empty_store_never_blocks() {
        let candidate = Coordinate::new(0.0, 0.0).unwrap();
        assert!(!DuplicateGuard::new().is_duplicate(&candidate, &[]));
    }
}
