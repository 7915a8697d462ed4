#![cfg(test)]

// Property tests for ChainingHashMap kept inside the crate so the growth
// policy and allocator accounting can be checked step by step.

use crate::allocator::TrackingAllocator;
use crate::chaining_hash_map::{ChainingHashMap, GROWTH_THRESHOLD};
use crate::error::Error;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Keys come from a small pool so updates and collisions are frequent;
// `Wide` keys exercise the full u32 range.
#[derive(Clone, Debug)]
enum Op {
    Set(u32, i32),
    Wide(u32, i32),
    Get(u32),
    Mutate(u32, i32),
    Resize(usize),
    Reinitialize(usize),
    Destroy,
    Iterate,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u32..64, any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        1 => (any::<u32>(), any::<i32>()).prop_map(|(k, v)| Op::Wide(k, v)),
        3 => (0u32..64).prop_map(Op::Get),
        2 => (0u32..64, any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => (0usize..40).prop_map(Op::Resize),
        1 => (0usize..8).prop_map(Op::Reinitialize),
        1 => Just(Op::Destroy),
        1 => Just(Op::Iterate),
    ]
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Every stored key is found with its latest value, across any number of
//   automatic and explicit rehashes.
// - `set` grows to `2n + 1` exactly when the load factor was above the
//   threshold (or the map had no buckets) before the call.
// - `load_factor == len / bucket_count` after every op.
// - Iteration yields the model's entries exactly once.
// - All entries and bucket arrays are returned to the allocator on drop.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(initial in 0usize..12, ops in proptest::collection::vec(arb_op(), 1..150)) {
        let alloc = TrackingAllocator::new();
        {
            let mut sut: ChainingHashMap<i32, _> = ChainingHashMap::with_bucket_count_in(initial, &alloc).unwrap();
            let mut model: HashMap<u32, i32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Set(k, v) | Op::Wide(k, v) => {
                        let buckets = sut.bucket_count();
                        let grows = buckets == 0 || sut.load_factor() > GROWTH_THRESHOLD;
                        prop_assert!(sut.set(k, v).is_ok());
                        model.insert(k, v);
                        if grows {
                            prop_assert_eq!(sut.bucket_count(), buckets * 2 + 1);
                        } else {
                            prop_assert_eq!(sut.bucket_count(), buckets);
                        }
                    }
                    Op::Get(k) => {
                        prop_assert_eq!(sut.contains(k), model.contains_key(&k));
                        prop_assert_eq!(sut.get(k), model.get(&k));
                        let fallback = model.get(&k).map_or(0, |v| v.wrapping_add(1));
                        prop_assert_eq!(sut.get_or(k, fallback), model.get(&k).copied().unwrap_or(fallback));
                    }
                    Op::Mutate(k, d) => {
                        match sut.get_mut(k) {
                            Some(v) => {
                                *v = v.wrapping_add(d);
                                let mv = model.get_mut(&k).expect("present in model");
                                *mv = mv.wrapping_add(d);
                            }
                            None => prop_assert!(!model.contains_key(&k)),
                        }
                    }
                    Op::Resize(n) => {
                        prop_assert!(sut.set_bucket_count(n).is_ok());
                        prop_assert_eq!(sut.bucket_count(), n.max(1));
                    }
                    Op::Reinitialize(n) => {
                        prop_assert!(sut.reinitialize(n).is_ok());
                        model.clear();
                        prop_assert_eq!(sut.bucket_count(), n.max(1));
                    }
                    Op::Destroy => {
                        sut.destroy();
                        model.clear();
                        prop_assert_eq!(sut.bucket_count(), 0);
                        prop_assert_eq!(alloc.used(), 0);
                    }
                    Op::Iterate => {
                        let seen: BTreeMap<u32, i32> = sut.iter().map(|(k, v)| (k, *v)).collect();
                        let expected: BTreeMap<u32, i32> = model.iter().map(|(&k, &v)| (k, v)).collect();
                        prop_assert_eq!(sut.iter().count(), model.len());
                        prop_assert_eq!(seen, expected);
                    }
                }

                // Post-conditions after each op
                prop_assert_eq!(sut.len(), model.len());
                let expected_lf = if sut.bucket_count() == 0 {
                    0.0
                } else {
                    sut.len() as f32 / sut.bucket_count() as f32
                };
                prop_assert_eq!(sut.load_factor(), expected_lf);
                for (&k, &v) in &model {
                    prop_assert_eq!(sut.get_or(k, v.wrapping_add(1)), v);
                }
                let blocks = model.len() + usize::from(sut.bucket_count() > 0);
                prop_assert_eq!(alloc.live_blocks(), blocks);
            }
        }
        prop_assert_eq!(alloc.used(), 0);
        prop_assert_eq!(alloc.live_blocks(), 0);
    }
}

// Property: rehashing to any bucket count is a value-preserving bijection
// over the key set.
proptest! {
    #[test]
    fn prop_rehash_preserves_entries(
        entries in proptest::collection::btree_map(any::<u32>(), any::<u64>(), 0..100),
        sizes in proptest::collection::vec(1usize..200, 1..6),
    ) {
        let mut m: ChainingHashMap<u64> = ChainingHashMap::with_bucket_count(7).unwrap();
        for (&k, &v) in &entries {
            m.set(k, v).unwrap();
        }
        for n in sizes {
            m.set_bucket_count(n).unwrap();
            prop_assert_eq!(m.len(), entries.len());
            for (&k, &v) in &entries {
                prop_assert!(m.contains(k));
                prop_assert_eq!(m.get_or(k, !v), v);
            }
            let keys: BTreeMap<u32, u64> = m.iter().map(|(k, v)| (k, *v)).collect();
            prop_assert_eq!(&keys, &entries);
        }
    }
}

// Property: under an allocation limit, a failing `set` leaves the map as it was.
proptest! {
    #[test]
    fn prop_failed_set_is_atomic(slack in 0usize..512, keys in proptest::collection::vec(0u32..1000, 1..80)) {
        let alloc = TrackingAllocator::new();
        let mut m: ChainingHashMap<u32, _> = ChainingHashMap::with_bucket_count_in(2, &alloc).unwrap();
        alloc.set_limit(Some(alloc.used() + slack));
        for k in keys {
            let snapshot: BTreeMap<u32, u32> = m.iter().map(|(k, v)| (k, *v)).collect();
            let before = (m.len(), m.bucket_count(), m.load_factor(), alloc.used(), alloc.live_blocks());
            match m.set(k, k ^ 0x5a5a) {
                Ok(()) => prop_assert_eq!(m.get_or(k, 0), k ^ 0x5a5a),
                Err(Error::OutOfMemory { .. }) => {
                    let after = (m.len(), m.bucket_count(), m.load_factor(), alloc.used(), alloc.live_blocks());
                    prop_assert_eq!(before, after);
                    let now: BTreeMap<u32, u32> = m.iter().map(|(k, v)| (k, *v)).collect();
                    prop_assert_eq!(snapshot, now);
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
