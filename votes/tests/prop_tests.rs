use std::sync::Arc;

use proptest::prelude::*;

use unswachh_nullables::NullReportStore;
use unswachh_store::{NewReport, ReportStore};
use unswachh_types::{Coordinate, ReportStatus, VoteChoice, VoterId};
use unswachh_votes::{InMemoryVoteRecords, VoteLedger};

fn arb_choice() -> impl Strategy<Value = VoteChoice> {
    prop_oneof![Just(VoteChoice::Up), Just(VoteChoice::Down)]
}

proptest! {
    /// After any sequence of casts, the counter equals the sum of every
    /// voter's last choice.
    #[test]
    fn counter_equals_sum_of_last_choices(
        casts in prop::collection::vec((0usize..4, arb_choice()), 0..40)
    ) {
        let store = Arc::new(NullReportStore::new());
        let report = store
            .create(NewReport {
                title: "t".to_string(),
                description: None,
                image_url: "u".to_string(),
                location_name: "Unknown Location".to_string(),
                location: Coordinate::new(0.0, 0.0).unwrap(),
                external_link: None,
            })
            .unwrap();
        store.set_status(&report.id, ReportStatus::Approved).unwrap();

        let ledger = VoteLedger::new(store.clone(), Arc::new(InMemoryVoteRecords::new()));
        let voters: Vec<VoterId> = (0..4)
            .map(|i| VoterId::new(format!("device-{i}")).unwrap())
            .collect();

        let mut last: [Option<VoteChoice>; 4] = [None; 4];
        for (who, choice) in casts {
            ledger.cast_vote(&voters[who], &report.id, choice).unwrap();
            last[who] = Some(choice);
        }

        let expected: i64 = last.iter().flatten().map(|c| c.unit_delta()).sum();
        prop_assert_eq!(store.get(&report.id).unwrap().votes, expected);
        for (who, choice) in last.iter().enumerate() {
            prop_assert_eq!(ledger.current_choice(&voters[who], &report.id).unwrap(), *choice);
        }
    }
}
