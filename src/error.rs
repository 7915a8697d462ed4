//! Status codes returned by fallible container operations.

use std::error;
use std::fmt;

use crate::allocator::AllocError;

/// Errors reported by `GrowableArray` and `ChainingHashMap`.
///
/// A container that returns one of these is left exactly as it was before
/// the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The allocator could not provide a block.
    OutOfMemory {
        /// Bytes the failed request needed; `usize::MAX` if the size
        /// computation itself overflowed.
        requested: usize,
    },
    /// `set` was called with an index strictly past the current length.
    IndexOutOfBounds {
        /// The index passed to `set`.
        index: usize,
        /// The array length at the time of the call.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: failed to allocate {requested} bytes")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
        }
    }
}

impl error::Error for Error {}

impl From<AllocError> for Error {
    fn from(e: AllocError) -> Self {
        Self::OutOfMemory {
            requested: e.requested(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
