// GrowableArray integration tests against the public API.
//
// Invariants exercised:
// - Appends grow a full buffer to `2 * capacity + 1`; capacity never
//   shrinks as a side effect of an append.
// - `get_or` returns the default for any index at or past `len`.
// - Explicit shrink truncates `len` and hides the tail.
// - `pop_or` never underflows.
// - All storage goes back to the allocator on destroy/drop, and failed
//   allocations leave the array unchanged.
use storage_containers::{Error, GrowableArray, TrackingAllocator};

// Test: push sequence across exactly one growth step.
// Assumes: the array starts with capacity 5.
// Verifies: no growth for 5 pushes, growth to 11 on the 6th, order kept,
// pop returns the 6th value and leaves length 5.
#[test]
fn push_past_initial_capacity() {
    let alloc = TrackingAllocator::new();
    let mut arr = GrowableArray::with_capacity_in(5, &alloc).unwrap();
    assert_eq!(alloc.used(), 5 * 4);

    for v in [1u32, 2, 4, 8, 16] {
        arr.push(v).unwrap();
    }
    assert_eq!(arr.len(), 5);
    assert_eq!(arr.capacity(), 5);
    assert_eq!(alloc.used(), 5 * 4);

    arr.push(0).unwrap();
    assert_eq!(arr.len(), 6);
    assert_eq!(arr.capacity(), 11);
    assert_eq!(alloc.used(), 11 * 4);
    for (i, v) in [1u32, 2, 4, 8, 16, 0].into_iter().enumerate() {
        assert_eq!(arr.get_or(i, 99), v);
    }

    assert_eq!(arr.pop_or(7), 0);
    assert_eq!(arr.len(), 5);

    drop(arr);
    assert_eq!(alloc.used(), 0);
    assert_eq!(alloc.live_blocks(), 0);
}

// Test: default returned for every out-of-range index in every state.
// Verifies: empty, populated, and destroyed arrays all fall back to the default.
#[test]
fn get_or_default_in_every_state() {
    let mut arr: GrowableArray<u16> = GrowableArray::new();
    assert_eq!(arr.get_or(0, 5), 5);
    assert!(!arr.contains(0));

    arr.set_capacity(10).unwrap();
    assert_eq!(arr.get_or(0, 5), 5);

    arr.push(1).unwrap();
    assert_eq!(arr.get_or(1, 5), 5);
    assert_eq!(arr.get_or(usize::MAX, 5), 5);

    arr.destroy();
    assert_eq!(arr.get_or(0, 5), 5);
}

// Test: shrink below length.
// Verifies: length is truncated and slots past the new capacity are gone,
// even after growing again.
#[test]
fn shrink_then_regrow_does_not_resurrect() {
    let mut arr: GrowableArray<u32> = GrowableArray::new();
    for v in 10..20 {
        arr.push(v).unwrap();
    }
    arr.set_capacity(4).unwrap();
    assert_eq!(arr.len(), 4);
    assert_eq!(arr.as_slice(), &[10, 11, 12, 13]);

    arr.set_capacity(20).unwrap();
    assert_eq!(arr.len(), 4);
    assert_eq!(arr.get_or(4, 0), 0);
    arr.push(1).unwrap();
    assert_eq!(arr.as_slice(), &[10, 11, 12, 13, 1]);
}

// Test: capacity is monotonic over a long run of appends.
#[test]
fn appends_never_shrink_capacity() {
    let mut arr: GrowableArray<u8> = GrowableArray::new();
    let mut last = 0;
    let mut steps = Vec::new();
    for i in 0..1000u32 {
        let len = arr.len();
        arr.set(len, (i % 251) as u8).unwrap();
        assert!(arr.capacity() >= last);
        if arr.capacity() != last {
            steps.push(arr.capacity());
        }
        last = arr.capacity();
    }
    assert_eq!(steps, vec![1, 3, 7, 15, 31, 63, 127, 255, 511, 1023]);
}

// Test: pop on empty array, repeatedly.
#[test]
fn pop_or_empty_repeatable() {
    let mut arr: GrowableArray<i32> = GrowableArray::new();
    for _ in 0..5 {
        assert_eq!(arr.pop_or(-1), -1);
        assert_eq!(arr.len(), 0);
    }
    arr.push(3).unwrap();
    assert_eq!(arr.pop_or(-1), 3);
    assert_eq!(arr.pop_or(-1), -1);
}

// Test: index past length.
// Verifies: `IndexOutOfBounds` carries the index and length; nothing changes.
#[test]
fn set_beyond_length_fails() {
    let mut arr: GrowableArray<u32> = GrowableArray::new();
    match arr.set(1, 9) {
        Err(Error::IndexOutOfBounds { index: 1, len: 0 }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(arr.capacity(), 0);
    assert!(arr.is_empty());
}

// Test: explicit resize under an allocation limit.
// Verifies: `set_capacity` and `reinitialize` failures are reported as
// `OutOfMemory`; a failed `set_capacity` keeps the array intact.
#[test]
fn resize_failures_are_atomic() {
    // Growth holds old and new blocks at once: 28 + 60 bytes at the 7 -> 15 step.
    let alloc = TrackingAllocator::with_limit(100);
    let mut arr = GrowableArray::new_in(&alloc);
    for v in 0..8u32 {
        arr.push(v).unwrap();
    }
    assert_eq!(arr.capacity(), 15);
    assert_eq!(alloc.used(), 60);

    assert_eq!(
        arr.set_capacity(100),
        Err(Error::OutOfMemory { requested: 400 })
    );
    assert_eq!(arr.capacity(), 15);
    assert_eq!(arr.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);

    // reinitialize frees first, so only the new block counts against the limit.
    assert!(arr.reinitialize(16).is_ok());
    assert_eq!(arr.capacity(), 16);
    assert!(arr.is_empty());
    assert!(matches!(
        arr.reinitialize(26),
        Err(Error::OutOfMemory { .. })
    ));
    assert_eq!(arr.capacity(), 0);
    assert_eq!(alloc.used(), 0);
}

// Test: mutable slot access and iteration.
#[test]
fn get_mut_and_iter() {
    let mut arr: GrowableArray<u64> = GrowableArray::new();
    for v in 1..=4 {
        arr.push(v).unwrap();
    }
    if let Some(slot) = arr.get_mut(1) {
        *slot *= 10;
    }
    for slot in arr.as_mut_slice() {
        *slot += 1;
    }
    let collected: Vec<u64> = arr.iter().copied().collect();
    assert_eq!(collected, vec![2, 21, 4, 5]);
    let total: u64 = (&arr).into_iter().sum();
    assert_eq!(total, 32);
    assert_eq!(arr.get(3), Some(&5));
    assert_eq!(arr.get(4), None);
}

#[test]
fn debug_shows_populated_prefix() {
    let mut arr: GrowableArray<u8> = GrowableArray::with_capacity(4).unwrap();
    arr.push(1).unwrap();
    arr.push(2).unwrap();
    assert_eq!(
        format!("{:?}", arr),
        "GrowableArray { capacity: 4, items: [1, 2] }"
    );
}
