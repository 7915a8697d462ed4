//! storage-containers: a growable array and a `u32`-keyed chaining hash
//! map, both drawing every block of storage from a pluggable allocator.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: two small, predictable containers for a storage engine, with
//!   explicit resize policies and strict failure semantics.
//! - Layers:
//!   - Allocator: zero-initializing allocate / free seam. `Global` uses
//!     the process heap; `TrackingAllocator` adds byte/block accounting
//!     and an optional limit.
//!   - GrowableArray<T, A>: contiguous buffer, `2n + 1` growth on append,
//!     truncating shrink on explicit resize.
//!   - ChainingHashMap<V, A>: bucket array of singly-linked chains, keyed
//!     by `u32`, rehashing to `2n + 1` buckets when the load factor is
//!     above 0.7 before an insertion.
//!
//! Constraints
//! - Single-threaded and single-owner: every mutation takes `&mut self`,
//!   so there is no internal locking and no reentrancy.
//! - Element types are plain values (`Copy`); slots start in their
//!   `Default` (zero) state.
//! - Every fallible operation returns `Result<_, Error>`; on error the
//!   container is exactly as it was before the call.
//!
//! Reference invalidation
//! - `get_mut` on either container hands out a borrow of internal storage.
//!   Any resize, rehash, append or pop needs `&mut self` as well, so the
//!   borrow checker rejects uses of a stale reference.
//!
//! Zero-size maps
//! - Map constructors and `set_bucket_count` never produce zero buckets.
//!   Only `destroy` does; a destroyed map reports every key as absent and
//!   regrows to one bucket on the next `set`.
//!
//! Notes and non-goals
//! - No `remove` on the map; entries live until `destroy` or drop.
//! - Chain order is not preserved across rehashes.
//! - No `Sync` sharing; wrap in a lock if several threads need access.

pub mod allocator;
pub mod chaining_hash_map;
mod chaining_hash_map_proptest;
pub mod error;
pub mod growable_array;
mod growable_array_proptest;

// Public surface
pub use allocator::{AllocError, Allocator, Global, TrackingAllocator};
pub use chaining_hash_map::{
    ChainingHashMap, DEFAULT_BUCKET_COUNT, GROWTH_THRESHOLD, MIN_BUCKET_COUNT,
};
pub use error::{Error, Result};
pub use growable_array::GrowableArray;
