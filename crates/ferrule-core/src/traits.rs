//! The capability trait shared by every buffer handle.

use crate::error::BufferError;

/// Common operations over a handle that owns or shares one buffer.
///
/// Implemented by both `ExclusiveHandle<T>` and `SharedHandle<T>` in
/// `ferrule-handle`. Generic code that only needs to inspect, read, or
/// release a buffer programs against this trait and works over either
/// ownership kind.
///
/// An *unallocated* handle has no buffer: `len() == 0`, `as_ptr()` is
/// null, and `as_slice()` is empty. Handles never hold an allocation of
/// length zero. `as_ptr()` is null exactly when the handle is
/// unallocated.
///
/// Mutable access is narrower than validity: [`get_mut`](Self::get_mut)
/// and [`as_mut_ptr`](Self::as_mut_ptr) also refuse (returning `None` or
/// null) on a valid handle whose buffer is aliased by other handles. A
/// null `as_mut_ptr()` therefore does not mean "unallocated"; test that
/// with [`is_valid`](Self::is_valid) or `as_ptr()`.
pub trait BufferHandle {
    /// The element type stored in the buffer.
    type Elem;

    /// The buffer contents, or an empty slice if unallocated.
    fn as_slice(&self) -> &[Self::Elem];

    /// Mutable access to the buffer contents.
    ///
    /// Returns `None` if the handle is unallocated, or if the handle
    /// cannot hand out exclusive access because the buffer is aliased.
    fn get_mut(&mut self) -> Option<&mut [Self::Elem]>;

    /// Move the buffer out into a new handle, leaving `self` unallocated.
    ///
    /// This is the only way to clear a handle's fields without releasing
    /// the buffer: ownership always travels with the returned handle.
    fn take(&mut self) -> Self
    where
        Self: Sized;

    /// Release this handle's claim on the buffer and become unallocated.
    fn free(&mut self);

    /// Whether the handle currently refers to a buffer.
    fn is_valid(&self) -> bool {
        !self.as_slice().is_empty()
    }

    /// Number of elements in the buffer.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer has no elements (equivalently, is unallocated).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the buffer contents in bytes.
    fn size_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<Self::Elem>()
    }

    /// Pointer to the first element, or null if unallocated.
    fn as_ptr(&self) -> *const Self::Elem {
        if self.is_valid() {
            self.as_slice().as_ptr()
        } else {
            std::ptr::null()
        }
    }

    /// Mutable pointer to the first element.
    ///
    /// Null if unallocated or if [`get_mut`](BufferHandle::get_mut)
    /// would return `None`.
    fn as_mut_ptr(&mut self) -> *mut Self::Elem {
        match self.get_mut() {
            Some(slice) => slice.as_mut_ptr(),
            None => std::ptr::null_mut(),
        }
    }

    /// Checked element access.
    fn get(&self, index: usize) -> Result<&Self::Elem, BufferError> {
        let slice = self.as_slice();
        slice.get(index).ok_or(BufferError::InvalidAccess {
            index,
            len: slice.len(),
        })
    }

    /// The first element, failing with [`BufferError::InvalidAccess`] if
    /// the handle is unallocated.
    fn first(&self) -> Result<&Self::Elem, BufferError> {
        self.get(0)
    }
}
