//! Allocator seam used by both containers.
//!
//! Every block a container owns (array buffer, bucket array, chain entry) is
//! obtained through an `Allocator` and handed back to the same allocator when
//! released. Failure is reported as `AllocError` and never retried here.
//!
//! - `Global` forwards to the process heap. Slice allocation goes through
//!   `Vec::try_reserve_exact` and node allocation through `std::alloc`, so
//!   exhaustion surfaces as an error instead of aborting.
//! - `TrackingAllocator` wraps `Global` with live-byte and live-block
//!   counters and an optional byte limit. Tests use it to assert that all
//!   storage is returned and to force `OutOfMemory` at precise points.

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::mem;

/// Allocation failure reported by an `Allocator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError {
    requested: usize,
}

impl AllocError {
    pub fn new(requested: usize) -> Self {
        Self { requested }
    }

    /// Bytes the failed request needed.
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation of {} bytes failed", self.requested)
    }
}

impl std::error::Error for AllocError {}

/// Zero-initializing allocate / free service.
///
/// Implementations must hand out blocks whose slots are all in their
/// `Default` state; for the plain numeric types and `Option<Box<_>>` links
/// the containers store, that is the all-zero value.
pub trait Allocator {
    /// Allocate a block of `len` default-initialized slots.
    fn allocate_zeroed<T: Default>(&self, len: usize) -> Result<Box<[T]>, AllocError>;

    /// Allocate a single node holding `value`.
    ///
    /// Exhaustion is reported as `AllocError`; `value` is dropped in that case.
    fn allocate<T>(&self, value: T) -> Result<Box<T>, AllocError>;

    /// Release a block previously returned by this allocator.
    fn free<T: ?Sized>(&self, block: Box<T>);
}

impl<A: Allocator> Allocator for &A {
    #[inline]
    fn allocate_zeroed<T: Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        (**self).allocate_zeroed(len)
    }

    #[inline]
    fn allocate<T>(&self, value: T) -> Result<Box<T>, AllocError> {
        (**self).allocate(value)
    }

    #[inline]
    fn free<T: ?Sized>(&self, block: Box<T>) {
        (**self).free(block)
    }
}

/// Byte size of `len` slots of `T`, `None` on overflow.
fn slice_bytes<T>(len: usize) -> Option<usize> {
    mem::size_of::<T>().checked_mul(len)
}

/// The process heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    fn allocate_zeroed<T: Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        let mut block: Vec<T> = Vec::new();
        block
            .try_reserve_exact(len)
            .map_err(|_| AllocError::new(slice_bytes::<T>(len).unwrap_or(usize::MAX)))?;
        block.resize_with(len, T::default);
        Ok(block.into_boxed_slice())
    }

    fn allocate<T>(&self, value: T) -> Result<Box<T>, AllocError> {
        let layout = Layout::new::<T>();
        if layout.size() == 0 {
            // Zero-sized boxes never touch the heap.
            return Ok(Box::new(value));
        }
        // SAFETY: `layout` has non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) }.cast::<T>();
        if ptr.is_null() {
            return Err(AllocError::new(layout.size()));
        }
        // SAFETY: `ptr` is a fresh, suitably aligned block of `layout` from the
        // global allocator, which is exactly what `Box<T>` releases on drop.
        unsafe {
            ptr.write(value);
            Ok(Box::from_raw(ptr))
        }
    }

    fn free<T: ?Sized>(&self, block: Box<T>) {
        drop(block);
    }
}

/// Accounting allocator backed by `Global`.
///
/// Counts the bytes and blocks currently handed out. With a limit set, any
/// request that would push `used()` past the limit fails with `AllocError`
/// and leaves the counters untouched.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    used: Cell<usize>,
    live_blocks: Cell<usize>,
    limit: Cell<Option<usize>>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracking allocator that refuses to hold more than `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        let a = Self::new();
        a.set_limit(Some(limit));
        a
    }

    /// Change (or lift, with `None`) the byte limit. Blocks already handed
    /// out are unaffected.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.limit.set(limit);
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.get()
    }

    /// Bytes currently allocated and not yet freed.
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Number of blocks currently allocated and not yet freed.
    pub fn live_blocks(&self) -> usize {
        self.live_blocks.get()
    }

    /// Check `bytes` more against the limit; returns the new total.
    fn admit(&self, bytes: Option<usize>) -> Result<usize, AllocError> {
        let requested = bytes.unwrap_or(usize::MAX);
        let total = bytes
            .and_then(|b| self.used.get().checked_add(b))
            .ok_or(AllocError::new(requested))?;
        match self.limit.get() {
            Some(limit) if total > limit => Err(AllocError::new(requested)),
            _ => Ok(total),
        }
    }

    fn record(&self, total: usize) {
        self.used.set(total);
        self.live_blocks.set(self.live_blocks.get() + 1);
    }
}

impl Allocator for TrackingAllocator {
    fn allocate_zeroed<T: Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        let total = self.admit(slice_bytes::<T>(len))?;
        let block = Global.allocate_zeroed(len)?;
        self.record(total);
        Ok(block)
    }

    fn allocate<T>(&self, value: T) -> Result<Box<T>, AllocError> {
        let total = self.admit(Some(mem::size_of::<T>()))?;
        let block = Global.allocate(value)?;
        self.record(total);
        Ok(block)
    }

    fn free<T: ?Sized>(&self, block: Box<T>) {
        let bytes = mem::size_of_val(&*block);
        Global.free(block);
        debug_assert!(self.used.get() >= bytes && self.live_blocks.get() > 0);
        self.used.set(self.used.get().saturating_sub(bytes));
        self.live_blocks.set(self.live_blocks.get().saturating_sub(1));
    }
}
