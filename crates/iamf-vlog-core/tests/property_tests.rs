//! Property-based tests for the ordered log store
//!
//! Uses proptest to verify ordering, stability and isolation of buffered
//! records under arbitrary insertion orders.

use iamf_vlog_core::{Category, OrderedLogStore, Payload, DRAIN_ORDER};
use proptest::prelude::*;

// ============================================================================
// Strategy Generators
// ============================================================================

fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Record),
        Just(Category::Container),
        Just(Category::DecoderOp),
    ]
}

/// Inserts as (category, key). Keys are drawn from a small range so that
/// duplicates are common.
fn inserts_strategy(max_ops: usize) -> impl Strategy<Value = Vec<(Category, u64)>> {
    prop::collection::vec((category_strategy(), 0..16u64), 0..max_ops)
}

/// Payload text tagging each insert with its position in the call sequence.
fn tag(seq: usize) -> String {
    format!("seq={seq}")
}

fn seq_of(text: &str) -> usize {
    text.trim_start_matches("seq=").parse().unwrap()
}

fn fill(inserts: &[(Category, u64)]) -> OrderedLogStore {
    let mut store = OrderedLogStore::new();
    store.open();
    for (seq, (category, key)) in inserts.iter().enumerate() {
        store
            .insert(*category, *key, Payload::new(&tag(seq), 256).unwrap())
            .unwrap();
    }
    store
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Every bucket drains in non-decreasing key order
    #[test]
    fn drain_is_sorted_per_category(inserts in inserts_strategy(200)) {
        let mut store = fill(&inserts);
        let drained = store.drain_all(&DRAIN_ORDER);

        for category in DRAIN_ORDER {
            let keys: Vec<u64> = drained
                .iter()
                .filter(|r| r.category == category)
                .map(|r| r.key)
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{} keys {:?}", category, keys);
        }
    }

    /// Equal keys keep their insertion order
    #[test]
    fn equal_keys_are_stable(inserts in inserts_strategy(200)) {
        let mut store = fill(&inserts);
        let drained = store.drain_all(&DRAIN_ORDER);

        for pair in drained.windows(2) {
            if pair[0].category == pair[1].category && pair[0].key == pair[1].key {
                prop_assert!(seq_of(pair[0].text()) < seq_of(pair[1].text()));
            }
        }
    }

    /// Draining is a stable sort of the inserts, grouped by drain order
    #[test]
    fn drain_matches_stable_sort(inserts in inserts_strategy(100)) {
        let mut store = fill(&inserts);
        let drained: Vec<(Category, u64, usize)> = store
            .drain_all(&DRAIN_ORDER)
            .iter()
            .map(|r| (r.category, r.key, seq_of(r.text())))
            .collect();

        let mut expected = Vec::new();
        for category in DRAIN_ORDER {
            let mut bucket: Vec<(Category, u64, usize)> = inserts
                .iter()
                .enumerate()
                .filter(|(_, (c, _))| *c == category)
                .map(|(seq, (c, k))| (*c, *k, seq))
                .collect();
            bucket.sort_by_key(|(_, key, _)| *key);
            expected.extend(bucket);
        }

        prop_assert_eq!(drained, expected);
    }

    /// Records never leak into another category's bucket
    #[test]
    fn categories_are_isolated(inserts in inserts_strategy(100)) {
        let store = fill(&inserts);

        for category in DRAIN_ORDER {
            let bucket = store.bucket(category);
            let expected = inserts.iter().filter(|(c, _)| *c == category).count();
            prop_assert_eq!(bucket.len(), expected);
            prop_assert!(bucket.iter().all(|r| r.category == category));
        }
    }

    /// Nothing stays buffered after a drain
    #[test]
    fn drain_releases_everything(inserts in inserts_strategy(100)) {
        let mut store = fill(&inserts);
        let drained = store.drain_all(&DRAIN_ORDER);

        prop_assert_eq!(drained.len(), inserts.len());
        prop_assert!(store.is_empty());
        prop_assert_eq!(store.pending_bytes(), 0);
        prop_assert!(!store.is_open());
    }
}
