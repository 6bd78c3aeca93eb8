//! Property tests for RecordSet index/list consistency.

use proptest::prelude::*;
use rostra_core::{FilterCriteria, Record, RecordKey, RecordSet, RecordSetError};
use rostra_test_utils::generators::{arb_record, arb_record_set};

fn assert_views_agree(set: &RecordSet) {
    let keys: Vec<RecordKey> = set.keys().collect();
    let mut unique = keys.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), keys.len(), "list repeats a key");
    for record in set.iter() {
        assert_eq!(set.get(record.key), Some(record));
    }
}

proptest! {
    #[test]
    fn prop_upsert_keeps_views_consistent(records in proptest::collection::vec(arb_record(), 0..40)) {
        let mut set = RecordSet::new();
        for record in records.iter().cloned() {
            set.upsert(record);
        }
        assert_views_agree(&set);

        let mut distinct: Vec<RecordKey> = records.iter().map(|r| r.key).collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(set.len(), distinct.len());
    }

    #[test]
    fn prop_merge_updates_in_place(set in arb_record_set(25), pick in any::<prop::sample::Index>()) {
        prop_assume!(!set.is_empty());
        let original_order: Vec<RecordKey> = set.keys().collect();
        let target = set.records()[pick.index(set.len())].clone();

        let mut changed = target.clone();
        changed.title = format!("{} (updated)", changed.title);
        changed.open_seats += 1;
        let update = RecordSet::from_records(vec![changed.clone()]).unwrap();

        let mut merged = set.clone();
        prop_assert_eq!(merged.merge(&update).unwrap(), 1);
        prop_assert_eq!(merged.keys().collect::<Vec<_>>(), original_order);
        prop_assert_eq!(merged.get(target.key), Some(&changed));
        for record in set.iter().filter(|r| r.key != target.key) {
            prop_assert_eq!(merged.get(record.key), Some(record));
        }
        assert_views_agree(&merged);
    }

    #[test]
    fn prop_merge_with_unknown_key_is_rejected(set in arb_record_set(25), stranger in arb_record()) {
        prop_assume!(!set.contains(stranger.key));
        let mut target = set.clone();
        let mut update = RecordSet::new();
        if let Some(first) = set.records().first() {
            update.insert_new(first.clone()).unwrap();
        }
        update.insert_new(stranger.clone()).unwrap();

        let err = target.merge(&update).unwrap_err();
        prop_assert_eq!(err, RecordSetError::KeyNotFound { key: stranger.key });
        prop_assert_eq!(target, set);
    }

    #[test]
    fn prop_json_round_trip(set in arb_record_set(30)) {
        let json = serde_json::to_vec(&set).unwrap();
        let restored: RecordSet = serde_json::from_slice(&json).unwrap();
        prop_assert_eq!(restored.records(), set.records());
        for key in set.keys() {
            prop_assert_eq!(restored.get(key), set.get(key));
        }
    }

    #[test]
    fn prop_filter_is_ordered_subsequence(set in arb_record_set(30)) {
        let open = set.filter(&FilterCriteria::new().open_only(true));
        let expected: Vec<&Record> = set.iter().filter(|r| r.is_open()).collect();
        prop_assert_eq!(open.iter().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn filter_open_only_and_closed_key_yields_nothing() {
    let set = RecordSet::from_records(vec![
        rostra_test_utils::section(1, "CSE 20289 01", "Systems", 5),
        rostra_test_utils::section(2, "CSE 20311 01", "Fundamentals", 2),
        rostra_test_utils::section(3, "CSE 30341 01", "Operating Systems", 0),
        rostra_test_utils::section(4, "CSE 30331 01", "Data Structures", 0),
        rostra_test_utils::section(5, "CSE 40175 01", "Ethics", 0),
    ])
    .unwrap();

    let criteria = FilterCriteria::new()
        .open_only(true)
        .with_keys([RecordKey::new(4)]);
    assert!(set.filter(&criteria).is_empty());
}
