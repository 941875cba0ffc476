//! Error types for buffer allocation and element access.
//!
//! Caller-contract violations on the raw-pointer entry points are not
//! represented here: those are `unsafe fn`s whose preconditions are
//! documented, not checked.

use std::error::Error;
use std::fmt;

/// Errors from buffer allocation and handle access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// The global allocator refused the request.
    ///
    /// Only the fallible (`try_*`) entry points return this. The
    /// infallible ones abort through the allocator's error handler.
    AllocationFailed {
        /// Number of elements requested.
        len: usize,
        /// Number of bytes requested.
        bytes: usize,
    },
    /// `len * size_of::<T>()` does not fit in `isize::MAX` bytes.
    CapacityOverflow {
        /// Number of elements requested.
        len: usize,
        /// Size of one element in bytes.
        elem_size: usize,
    },
    /// Element access on an unallocated handle, or past its end.
    InvalidAccess {
        /// The index that was requested.
        index: usize,
        /// Length of the handle at the time of the access.
        len: usize,
    },
}

impl BufferError {
    /// Whether this error came from the allocation path.
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::CapacityOverflow { .. }
        )
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { len, bytes } => {
                write!(f, "buffer allocation failed: {len} elements ({bytes} bytes)")
            }
            Self::CapacityOverflow { len, elem_size } => {
                write!(f, "buffer capacity overflow: {len} elements of {elem_size} bytes")
            }
            Self::InvalidAccess { index, len: 0 } => {
                write!(f, "invalid access: index {index} into an empty buffer")
            }
            Self::InvalidAccess { index, len } => {
                write!(f, "invalid access: index {index} out of bounds for length {len}")
            }
        }
    }
}

impl Error for BufferError {}
