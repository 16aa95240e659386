use proptest::prelude::*;

use unswachh_geo::{distance_m, DuplicateGuard, DUPLICATE_RADIUS_M};
use unswachh_types::{Coordinate, Report, ReportId, ReportStatus, Timestamp};

fn arb_coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon).unwrap())
}

/// Points within a few hundred meters of a base, so the radius actually matters.
fn arb_nearby(base: Coordinate) -> impl Strategy<Value = Coordinate> {
    (-0.003f64..0.003, -0.003f64..0.003).prop_map(move |(dlat, dlon)| {
        let lat = (base.latitude() + dlat).clamp(-90.0, 90.0);
        let lon = (base.longitude() + dlon).clamp(-180.0, 180.0);
        Coordinate::new(lat, lon).unwrap()
    })
}

fn arb_status() -> impl Strategy<Value = ReportStatus> {
    prop_oneof![Just(ReportStatus::InReview), Just(ReportStatus::Approved)]
}

fn report(seed: usize, location: Coordinate, status: ReportStatus) -> Report {
    Report {
        id: ReportId::new([seed as u8; 16]),
        title: "overflowing bin".to_string(),
        description: None,
        image_url: "https://img.example/x.jpg".to_string(),
        location_name: "Unknown Location".to_string(),
        location,
        status,
        votes: 0,
        created_at: Timestamp::new(seed as u64),
        external_link: None,
    }
}

proptest! {
    /// distance(p, p) == 0 for every valid point.
    #[test]
    fn distance_to_self_is_zero(p in arb_coordinate()) {
        prop_assert_eq!(distance_m(&p, &p), 0.0);
    }

    /// distance(a, b) == distance(b, a).
    #[test]
    fn distance_is_symmetric(a in arb_coordinate(), b in arb_coordinate()) {
        let ab = distance_m(&a, &b);
        let ba = distance_m(&b, &a);
        prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
    }

    /// Distances are never negative and never exceed half the circumference.
    #[test]
    fn distance_is_bounded(a in arb_coordinate(), b in arb_coordinate()) {
        let d = distance_m(&a, &b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * unswachh_geo::EARTH_RADIUS_M + 1e-6);
    }

    /// is_duplicate is exactly "minimum distance < 50 m", whatever the statuses.
    #[test]
    fn duplicate_iff_min_distance_below_radius(
        (candidate, others) in arb_coordinate().prop_flat_map(|base| {
            (
                arb_nearby(base),
                prop::collection::vec((arb_nearby(base), arb_status()), 0..8),
            )
        })
    ) {
        let existing: Vec<Report> = others
            .into_iter()
            .enumerate()
            .map(|(i, (loc, status))| report(i, loc, status))
            .collect();

        let min = existing
            .iter()
            .map(|r| distance_m(&candidate, &r.location))
            .fold(f64::INFINITY, f64::min);

        prop_assert_eq!(
            DuplicateGuard::new().is_duplicate(&candidate, &existing),
            min < DUPLICATE_RADIUS_M
        );
    }
}
