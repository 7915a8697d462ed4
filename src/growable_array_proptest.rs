#![cfg(test)]

// Property tests for GrowableArray kept inside the crate so they can use
// the tracking allocator against the array's internal growth policy.

use crate::allocator::TrackingAllocator;
use crate::error::Error;
use crate::growable_array::GrowableArray;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Push(u32),
    Set(usize, u32),
    Pop(u32),
    SetCapacity(usize),
    Mutate(usize, u32),
    Reinitialize(usize),
    Destroy,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Push),
        2 => (0usize..40, any::<u32>()).prop_map(|(i, v)| Op::Set(i, v)),
        2 => any::<u32>().prop_map(Op::Pop),
        1 => (0usize..40).prop_map(Op::SetCapacity),
        1 => (0usize..40, any::<u32>()).prop_map(|(i, v)| Op::Mutate(i, v)),
        1 => (0usize..10).prop_map(Op::Reinitialize),
        1 => Just(Op::Destroy),
    ]
}

// Property: State-machine equivalence against Vec<u32>.
// Invariants exercised across random operation sequences:
// - `get_or`/`contains` agree with the model for in- and out-of-range indices.
// - `set` appends only at `len`, overwrites below it, rejects above it.
// - Appends never shrink capacity; a full append grows to `2n + 1`.
// - `set_capacity` truncates `len` to the new capacity.
// - `pop_or` never underflows.
// - `len <= capacity` after every op and all storage returns on drop.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..120)) {
        let alloc = TrackingAllocator::new();
        {
            let mut sut: GrowableArray<u32, _> = GrowableArray::new_in(&alloc);
            let mut model: Vec<u32> = Vec::new();

            for op in ops {
                let cap_before = sut.capacity();
                match op {
                    Op::Push(v) => {
                        let full = sut.len() == cap_before;
                        prop_assert!(sut.push(v).is_ok());
                        model.push(v);
                        if full {
                            prop_assert_eq!(sut.capacity(), cap_before * 2 + 1);
                        } else {
                            prop_assert_eq!(sut.capacity(), cap_before);
                        }
                    }
                    Op::Set(i, v) => {
                        let res = sut.set(i, v);
                        if i < model.len() {
                            prop_assert!(res.is_ok());
                            model[i] = v;
                        } else if i == model.len() {
                            prop_assert!(res.is_ok());
                            model.push(v);
                            prop_assert!(sut.capacity() >= cap_before);
                        } else {
                            prop_assert_eq!(res, Err(Error::IndexOutOfBounds { index: i, len: model.len() }));
                            prop_assert_eq!(sut.capacity(), cap_before);
                        }
                    }
                    Op::Pop(d) => {
                        let expected = model.pop().unwrap_or(d);
                        prop_assert_eq!(sut.pop_or(d), expected);
                    }
                    Op::SetCapacity(n) => {
                        prop_assert!(sut.set_capacity(n).is_ok());
                        model.truncate(n);
                        prop_assert_eq!(sut.capacity(), n);
                    }
                    Op::Mutate(i, v) => {
                        match sut.get_mut(i) {
                            Some(slot) => {
                                *slot = v;
                                model[i] = v;
                            }
                            None => prop_assert!(i >= model.len()),
                        }
                    }
                    Op::Reinitialize(n) => {
                        prop_assert!(sut.reinitialize(n).is_ok());
                        model.clear();
                        prop_assert_eq!(sut.capacity(), n);
                    }
                    Op::Destroy => {
                        sut.destroy();
                        model.clear();
                        prop_assert_eq!(sut.capacity(), 0);
                        prop_assert_eq!(alloc.live_blocks(), 0);
                    }
                }

                prop_assert_eq!(sut.len(), model.len());
                prop_assert!(sut.len() <= sut.capacity());
                prop_assert_eq!(sut.as_slice(), model.as_slice());
                for i in 0..model.len() + 2 {
                    prop_assert_eq!(sut.contains(i), i < model.len());
                    prop_assert_eq!(sut.get_or(i, u32::MAX), model.get(i).copied().unwrap_or(u32::MAX));
                }
                prop_assert!(alloc.live_blocks() <= 1);
            }
        }
        prop_assert_eq!(alloc.used(), 0);
    }
}

// Property: N pushes from empty store exactly the pushed sequence.
proptest! {
    #[test]
    fn prop_push_sequence_is_readable(values in proptest::collection::vec(any::<i64>(), 0..300)) {
        let mut arr: GrowableArray<i64> = GrowableArray::new();
        for &v in &values {
            arr.push(v).unwrap();
        }
        prop_assert_eq!(arr.len(), values.len());
        for (i, &v) in values.iter().enumerate() {
            prop_assert_eq!(arr.get_or(i, !v), v);
        }
        prop_assert_eq!(arr.get_or(values.len(), 7), 7);
    }
}

// Property: under an allocation limit, a failing push leaves the array as it was.
proptest! {
    #[test]
    fn prop_failed_push_is_atomic(limit in 0usize..256, values in proptest::collection::vec(any::<u32>(), 1..80)) {
        let alloc = TrackingAllocator::with_limit(limit);
        let mut arr: GrowableArray<u32, _> = GrowableArray::new_in(&alloc);
        for v in values {
            let before = (arr.len(), arr.capacity(), arr.as_slice().to_vec(), alloc.used());
            match arr.push(v) {
                Ok(()) => prop_assert_eq!(arr.get_or(before.0, !v), v),
                Err(Error::OutOfMemory { .. }) => {
                    let after = (arr.len(), arr.capacity(), arr.as_slice().to_vec(), alloc.used());
                    prop_assert_eq!(before, after);
                    break;
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
