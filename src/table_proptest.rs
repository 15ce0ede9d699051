#![cfg(test)]

// Property tests for Table kept inside the crate so they can exercise
// small capacities and internal accessors without feature gates.

use crate::table::{Table, TableError, TableOptions};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Update(usize, i64),
    UpdateOnly(usize, i64),
    Search(usize),
    SearchForeign(String),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Update(i, v)),
            (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::UpdateOnly(i, v)),
            idx.clone().prop_map(OpI::Search),
            "[A-Z]{1,6}".prop_map(OpI::SearchForeign),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap,
// with a tiny initial capacity so random runs cross several resizes.
// Invariants exercised across random operation sequences:
// - `update` is upsert: last write wins for every key.
// - `update_only` hits exactly the model's key set and never inserts.
// - `search` parity with the model, including foreign (never-inserted)
//   keys, which must miss.
// - `len` equals the model's cardinality after every op; resizes never
//   lose or duplicate an entry.
// - `capacity` never exceeds `max_capacity`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: Table<i64> = Table::new(TableOptions::new().size(2)).unwrap();
        let mut model: HashMap<String, i64> = HashMap::new();

        for op in ops {
            match op {
                OpI::Update(i, v) => {
                    let k = &pool[i];
                    sut.update(k, v).unwrap();
                    model.insert(k.clone(), v);
                }
                OpI::UpdateOnly(i, v) => {
                    let k = &pool[i];
                    match sut.update_only(k, v) {
                        Ok(()) => {
                            prop_assert!(model.contains_key(k));
                            model.insert(k.clone(), v);
                        }
                        Err(TableError::KeyNotFound) => {
                            prop_assert!(!model.contains_key(k));
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {e:?}"),
                    }
                }
                OpI::Search(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.search(k), model.get(k).copied());
                }
                OpI::SearchForeign(k) => {
                    // uppercase keys never enter the pool
                    prop_assert_eq!(sut.search(&k), None);
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity() <= sut.max_capacity());
        }

        // final sweep: every model entry is retrievable
        for (k, v) in &model {
            prop_assert_eq!(sut.search(k), Some(*v));
        }
    }

    // Property: with a hard cap, admission is exactly "distinct keys fit
    // below capacity". New keys fail with CapacityExhausted precisely when
    // the key set would reach the cap; existing keys always update.
    #[test]
    fn prop_bounded_capacity((pool, ops) in arb_scenario()) {
        let cap = 4usize;
        let mut sut: Table<i64> = Table::new(
            TableOptions::new().size(cap).max_size(cap),
        ).unwrap();
        let mut model: HashMap<String, i64> = HashMap::new();

        for op in ops {
            if let OpI::Update(i, v) = op {
                let k = &pool[i];
                let known = model.contains_key(k);
                match sut.update(k, v) {
                    Ok(()) => {
                        prop_assert!(
                            known || model.len() + 1 < cap,
                            "admission past the capacity gate"
                        );
                        model.insert(k.clone(), v);
                    }
                    Err(TableError::CapacityExhausted) => {
                        prop_assert!(!known, "existing keys must always update");
                        prop_assert!(model.len() + 1 >= cap);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {e:?}"),
                }
                prop_assert_eq!(sut.capacity(), cap);
                prop_assert_eq!(sut.len(), model.len());
            }
        }

        for (k, v) in &model {
            prop_assert_eq!(sut.search(k), Some(*v));
        }
    }
}
