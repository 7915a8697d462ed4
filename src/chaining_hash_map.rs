//! ChainingHashMap: `u32`-keyed map with separate chaining.
//!
//! Buckets are chain heads; entry `key` lives in bucket
//! `key mod bucket_count`. Each entry is a separately allocated node owned
//! by its predecessor, so rehashing relinks nodes instead of copying them.
//!
//! - `set` rehashes to `2 * bucket_count + 1` buckets when the load factor
//!   is above `GROWTH_THRESHOLD` before the insertion.
//! - A map always has at least one bucket, except after `destroy`; a
//!   destroyed map answers every lookup with "absent" and regrows on the
//!   next `set`.
//! - Chain order is not stable across rehashes (relinking prepends).

use core::fmt;
use core::mem;

use crate::allocator::{Allocator, Global};
use crate::error::Result;
use crate::growable_array::grown;

/// Load factor above which `set` rehashes before inserting.
pub const GROWTH_THRESHOLD: f32 = 0.7;

/// Bucket count used by constructors that do not take one.
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Smallest bucket count a map is ever resized to.
pub const MIN_BUCKET_COUNT: usize = 1;

struct Entry<V> {
    key: u32,
    value: V,
    next: Link<V>,
}

type Link<V> = Option<Box<Entry<V>>>;

#[inline]
fn bucket_of(key: u32, bucket_count: usize) -> usize {
    (u64::from(key) % bucket_count as u64) as usize
}

#[inline]
fn ratio(len: usize, bucket_count: usize) -> f32 {
    if bucket_count == 0 {
        0.0
    } else {
        len as f32 / bucket_count as f32
    }
}

pub struct ChainingHashMap<V, A: Allocator = Global> {
    buckets: Box<[Link<V>]>,
    len: usize,
    growth_threshold: f32,
    load_factor: f32,
    alloc: A,
}

impl<V: Copy> ChainingHashMap<V> {
    /// Map with `DEFAULT_BUCKET_COUNT` buckets on the global heap.
    pub fn new() -> Result<Self> {
        Self::new_in(Global)
    }

    pub fn with_bucket_count(bucket_count: usize) -> Result<Self> {
        Self::with_bucket_count_in(bucket_count, Global)
    }
}

impl<V: Copy, A: Allocator> ChainingHashMap<V, A> {
    pub fn new_in(alloc: A) -> Result<Self> {
        Self::with_bucket_count_in(DEFAULT_BUCKET_COUNT, alloc)
    }

    /// Map with `max(bucket_count, 1)` buckets drawn from `alloc`.
    pub fn with_bucket_count_in(bucket_count: usize, alloc: A) -> Result<Self> {
        let mut map = Self {
            buckets: Box::default(),
            len: 0,
            growth_threshold: GROWTH_THRESHOLD,
            load_factor: 0.0,
            alloc,
        };
        map.set_bucket_count(bucket_count)?;
        Ok(map)
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// `len() / bucket_count()`, or 0.0 for a destroyed map.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    pub fn growth_threshold(&self) -> f32 {
        self.growth_threshold
    }

    /// Rehash every entry into a fresh array of `max(bucket_count, 1)`
    /// buckets.
    ///
    /// Entries are moved, not copied. On `OutOfMemory` the map is unchanged.
    pub fn set_bucket_count(&mut self, bucket_count: usize) -> Result<()> {
        let bucket_count = bucket_count.max(MIN_BUCKET_COUNT);
        let mut fresh: Box<[Link<V>]> = self.alloc.allocate_zeroed(bucket_count)?;

        for head in self.buckets.iter_mut() {
            let mut cursor = head.take();
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
                let slot = &mut fresh[bucket_of(entry.key, bucket_count)];
                entry.next = slot.take();
                *slot = Some(entry);
            }
        }

        let old = mem::replace(&mut self.buckets, fresh);
        if !old.is_empty() {
            self.alloc.free(old);
        }
        self.refresh_load_factor();
        Ok(())
    }

    /// Free every entry and the bucket array. The growth threshold is kept.
    pub fn destroy(&mut self) {
        self.free_storage();
    }

    /// `destroy` followed by `set_bucket_count(bucket_count)`.
    pub fn reinitialize(&mut self, bucket_count: usize) -> Result<()> {
        self.destroy();
        self.set_bucket_count(bucket_count)
    }

    pub fn contains(&self, key: u32) -> bool {
        self.find(key).is_some()
    }

    /// Value stored under `key`, or `default`.
    pub fn get_or(&self, key: u32, default: V) -> V {
        self.find(key).map_or(default, |e| e.value)
    }

    pub fn get(&self, key: u32) -> Option<&V> {
        self.find(key).map(|e| &e.value)
    }

    /// Mutable access to the value stored under `key`.
    ///
    /// The borrow holds the map exclusively, so no insertion or rehash can
    /// move the entry while it is alive.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        if self.buckets.is_empty() {
            return None;
        }
        let index = bucket_of(key, self.buckets.len());
        let mut link = self.buckets[index].as_deref_mut();
        while let Some(entry) = link {
            if entry.key == key {
                return Some(&mut entry.value);
            }
            link = entry.next.as_deref_mut();
        }
        None
    }

    /// Insert `value` under `key`, or overwrite the existing value.
    ///
    /// If the load factor is above the growth threshold (or the map has no
    /// buckets), the map first rehashes to `2 * bucket_count + 1` buckets.
    /// A new key is appended at the tail of its chain. If either the rehash
    /// or the entry allocation fails, the map is unchanged.
    pub fn set(&mut self, key: u32, value: V) -> Result<()> {
        let node = if self.contains(key) {
            None
        } else {
            Some(self.alloc.allocate(Entry {
                key,
                value,
                next: None,
            })?)
        };

        if self.buckets.is_empty() || self.load_factor > self.growth_threshold {
            let resized = grown(self.buckets.len()).and_then(|n| self.set_bucket_count(n));
            if let Err(e) = resized {
                if let Some(node) = node {
                    self.alloc.free(node);
                }
                return Err(e);
            }
        }

        match node {
            None => {
                if let Some(slot) = self.get_mut(key) {
                    *slot = value;
                }
            }
            Some(node) => {
                let index = bucket_of(key, self.buckets.len());
                let mut link = &mut self.buckets[index];
                while let Some(entry) = link {
                    link = &mut entry.next;
                }
                *link = Some(node);
                self.len += 1;
            }
        }
        self.refresh_load_factor();
        Ok(())
    }

    /// Iterate over `(key, &value)` pairs in bucket order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    fn find(&self, key: u32) -> Option<&Entry<V>> {
        if self.buckets.is_empty() {
            return None;
        }
        let mut link = self.buckets[bucket_of(key, self.buckets.len())].as_deref();
        while let Some(entry) = link {
            if entry.key == key {
                return Some(entry);
            }
            link = entry.next.as_deref();
        }
        None
    }

    fn refresh_load_factor(&mut self) {
        self.load_factor = ratio(self.len, self.buckets.len());
    }
}

impl<V, A: Allocator> ChainingHashMap<V, A> {
    // Chains are unlinked one node at a time so their length never turns
    // into recursion depth.
    fn free_storage(&mut self) {
        let mut buckets = mem::take(&mut self.buckets);
        for head in buckets.iter_mut() {
            let mut cursor = head.take();
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
                self.alloc.free(entry);
            }
        }
        if !buckets.is_empty() {
            self.alloc.free(buckets);
        }
        self.len = 0;
        self.load_factor = 0.0;
    }
}

impl<V, A: Allocator> Drop for ChainingHashMap<V, A> {
    fn drop(&mut self) {
        self.free_storage();
    }
}

/// Iterator over the entries of a `ChainingHashMap`.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Link<V>>,
    chain: Option<&'a Entry<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain {
                self.chain = entry.next.as_deref();
                self.remaining -= 1;
                return Some((entry.key, &entry.value));
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V: Copy, A: Allocator> IntoIterator for &'a ChainingHashMap<V, A> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, A: Allocator> fmt::Debug for ChainingHashMap<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        };
        f.debug_map().entries(entries).finish()
    }
}
