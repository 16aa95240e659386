use proptest::prelude::*;

use unswachh_types::{Coordinate, ReportId, ReportStatus, Timestamp, VoteChoice};

fn arb_choice() -> impl Strategy<Value = VoteChoice> {
    prop_oneof![Just(VoteChoice::Up), Just(VoteChoice::Down)]
}

proptest! {
    /// ReportId survives its hex text form.
    #[test]
    fn report_id_text_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = ReportId::new(bytes);
        let parsed: ReportId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// ReportId serializes as a JSON string and through bincode alike.
    #[test]
    fn report_id_serde_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = ReportId::new(bytes);
        let json = serde_json::to_string(&id).unwrap();
        prop_assert_eq!(json.len(), 34);
        let from_json: ReportId = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(from_json, id);
        let encoded = bincode::serialize(&id).unwrap();
        let from_bincode: ReportId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(from_bincode, id);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// monotonic_after is strictly greater than the floor and never earlier than self.
    #[test]
    fn timestamp_monotonic_after(now in 0u64..1_000_000, floor in 0u64..1_000_000) {
        let next = Timestamp::new(now).monotonic_after(Timestamp::new(floor));
        prop_assert!(next > Timestamp::new(floor));
        prop_assert!(next >= Timestamp::new(now));
    }

    /// Timestamp elapsed_since saturates to 0 when now < self.
    #[test]
    fn timestamp_elapsed_since_saturates(base in 1u64..1_000_000, deficit in 1u64..1_000_000) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_since(earlier), 0);
        prop_assert_eq!(earlier.elapsed_since(later), deficit);
    }

    /// Casting a choice and then its opposite nets exactly the opposite unit.
    #[test]
    fn vote_choice_flip_arithmetic(choice in arb_choice()) {
        let first = choice.unit_delta();
        let flip = 2 * choice.opposite().unit_delta();
        prop_assert_eq!(first + flip, choice.opposite().unit_delta());
        prop_assert_eq!(choice.opposite().opposite(), choice);
    }

    /// Every in-range pair is a valid coordinate.
    #[test]
    fn coordinate_accepts_in_range(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
        let c = Coordinate::new(lat, lon).unwrap();
        prop_assert_eq!(c.latitude(), lat);
        prop_assert_eq!(c.longitude(), lon);
    }

    /// Latitudes beyond the poles are rejected.
    #[test]
    fn coordinate_rejects_out_of_range(lat in 90.0001f64..1000.0, lon in -180.0f64..=180.0) {
        prop_assert!(Coordinate::new(lat, lon).is_err());
        prop_assert!(Coordinate::new(-lat, lon).is_err());
    }
}

#[test]
fn report_status_text_forms() {
    assert_eq!(ReportStatus::InReview.to_string(), "in-review");
    assert_eq!("approved".parse::<ReportStatus>().unwrap(), ReportStatus::Approved);
    assert!("rejected".parse::<ReportStatus>().is_err());
    assert_eq!(
        serde_json::to_string(&ReportStatus::InReview).unwrap(),
        "\"in-review\""
    );
}

#[test]
fn report_status_only_moves_forward() {
    assert!(ReportStatus::InReview.can_transition_to(ReportStatus::Approved));
    assert!(ReportStatus::InReview.can_transition_to(ReportStatus::InReview));
    assert!(ReportStatus::Approved.can_transition_to(ReportStatus::Approved));
    assert!(!ReportStatus::Approved.can_transition_to(ReportStatus::InReview));
}
