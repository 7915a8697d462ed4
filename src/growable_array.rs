//! GrowableArray: contiguous buffer with explicit capacity and logical length.

use core::fmt;
use core::mem;

use crate::allocator::{Allocator, Global};
use crate::error::{Error, Result};

/// Capacity chosen when an append finds the buffer full.
///
/// `2 * capacity + 1` so an empty array still makes progress.
#[inline]
pub(crate) fn grown(current: usize) -> Result<usize> {
    current
        .checked_mul(2)
        .and_then(|c| c.checked_add(1))
        .ok_or(Error::OutOfMemory {
            requested: usize::MAX,
        })
}

/// A growable array of plain values.
///
/// Slots `0..len()` are populated; slots `len()..capacity()` hold the
/// default value and are unreachable through the public API.
pub struct GrowableArray<T, A: Allocator = Global> {
    buffer: Box<[T]>,
    len: usize,
    alloc: A,
}

impl<T: Copy + Default> GrowableArray<T> {
    /// Empty array on the global heap. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T: Copy + Default> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, A: Allocator> GrowableArray<T, A> {
    /// Empty array drawing storage from `alloc`. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            buffer: Box::default(),
            len: 0,
            alloc,
        }
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut arr = Self::new_in(alloc);
        arr.set_capacity(capacity)?;
        Ok(arr)
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slot count.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Replace the buffer with one of exactly `new_capacity` slots.
    ///
    /// The first `min(len, new_capacity)` elements keep their positions.
    /// Shrinking below `len` truncates; elements past the new capacity are
    /// discarded. On `OutOfMemory` the array is unchanged.
    pub fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
        let mut fresh: Box<[T]> = if new_capacity == 0 {
            Box::default()
        } else {
            self.alloc.allocate_zeroed(new_capacity)?
        };

        let kept = self.len.min(new_capacity);
        fresh[..kept].copy_from_slice(&self.buffer[..kept]);

        let old = mem::replace(&mut self.buffer, fresh);
        self.release(old);
        self.len = kept;
        Ok(())
    }

    /// Release the buffer and return to the empty state. Idempotent.
    pub fn destroy(&mut self) {
        let old = mem::take(&mut self.buffer);
        self.release(old);
        self.len = 0;
    }

    /// `destroy` followed by `set_capacity(new_capacity)`.
    pub fn reinitialize(&mut self, new_capacity: usize) -> Result<()> {
        self.destroy();
        self.set_capacity(new_capacity)
    }

    /// True iff `index < len()`.
    pub fn contains(&self, index: usize) -> bool {
        index < self.len
    }

    /// Element at `index`, or `default` when `index >= len()`.
    pub fn get_or(&self, index: usize, default: T) -> T {
        self.get(index).copied().unwrap_or(default)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable access to the slot at `index`, if populated.
    ///
    /// The borrow holds the array exclusively, so no resize, append or pop
    /// can invalidate it while it is alive.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Overwrite `index` if populated, or append when `index == len()`.
    ///
    /// Appending to a full array first grows it to `2 * capacity + 1`.
    /// `index > len()` fails with `IndexOutOfBounds`; a failed growth fails
    /// with `OutOfMemory`. Either way the array is unchanged.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        if index == self.len {
            if self.len == self.capacity() {
                self.set_capacity(grown(self.capacity())?)?;
            }
            self.len += 1;
        }
        self.buffer[index] = value;
        Ok(())
    }

    /// Append `value`; same as `set(len(), value)`.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.set(self.len, value)
    }

    /// Remove and return the last element, or `default` when empty.
    pub fn pop_or(&mut self, default: T) -> T {
        match self.len.checked_sub(1) {
            Some(last) => {
                self.len = last;
                self.buffer[last]
            }
            None => default,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buffer[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buffer[..self.len]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    // Empty buffers never came from the allocator.
    fn release(&self, block: Box<[T]>) {
        if !block.is_empty() {
            self.alloc.free(block);
        }
    }
}

impl<T, A: Allocator> Drop for GrowableArray<T, A> {
    fn drop(&mut self) {
        let block = mem::take(&mut self.buffer);
        if !block.is_empty() {
            self.alloc.free(block);
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for GrowableArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableArray")
            .field("capacity", &self.buffer.len())
            .field("items", &&self.buffer[..self.len])
            .finish()
    }
}

impl<'a, T: Copy + Default, A: Allocator> IntoIterator for &'a GrowableArray<T, A> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
