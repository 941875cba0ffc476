//! Owned raw buffers and the raw-pointer primitives.
//!
//! Everything that touches a bare `(*T, len)` pair lives here. Each
//! `unsafe` block carries a `// SAFETY:` comment naming the caller
//! obligation it relies on. Lengths passed alongside raw pointers are
//! trusted: only null pointers and zero lengths are checked.

#![allow(unsafe_code)]

use std::ptr;

use crate::alloc::allocate_from_slice;

/// A heap buffer of `T` owned by exactly one value.
///
/// Produced by the allocation functions in this crate and consumed by the
/// handle constructors that adopt a buffer. Because adopting moves the
/// `RawBuffer`, the type system rules out two owners of one allocation.
///
/// An empty `RawBuffer` holds no allocation.
#[derive(Debug)]
pub struct RawBuffer<T> {
    data: Option<Box<[T]>>,
}

impl<T> RawBuffer<T> {
    /// A buffer with no allocation.
    pub const fn empty() -> Self {
        Self { data: None }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    /// Whether the buffer holds no allocation.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Pointer to the first element, or null if empty.
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ref().map_or(ptr::null(), |d| d.as_ptr())
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }

    /// Give up ownership of the allocation as a boxed slice.
    ///
    /// Returns `None` for an empty buffer.
    pub fn into_boxed_slice(self) -> Option<Box<[T]>> {
        self.data
    }

    /// Release ownership as a raw `(pointer, length)` pair.
    ///
    /// An empty buffer yields `(null, 0)`. The allocation is leaked until
    /// it is passed back to [`RawBuffer::from_raw`].
    pub fn into_raw(self) -> (*mut T, usize) {
        match self.data {
            Some(boxed) => {
                let len = boxed.len();
                (Box::into_raw(boxed).cast::<T>(), len)
            }
            None => (ptr::null_mut(), 0),
        }
    }

    /// Adopt an allocation previously released by [`RawBuffer::into_raw`].
    ///
    /// A null `ptr` or a zero `len` yields an empty buffer. The caller's
    /// pointer must not be used after this call.
    ///
    /// # Safety
    ///
    /// If `ptr` is non-null and `len > 0`, the pair must have come from
    /// [`RawBuffer::into_raw`] (with exactly that length) and must not
    /// have been adopted already.
    pub unsafe fn from_raw(ptr: *mut T, len: usize) -> Self {
        if ptr.is_null() || len == 0 {
            return Self::empty();
        }
        // SAFETY: the caller guarantees `(ptr, len)` is a boxed slice
        // released by `into_raw` and not yet reclaimed.
        let boxed = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)) };
        Self { data: Some(boxed) }
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<[T]>> for RawBuffer<T> {
    fn from(boxed: Box<[T]>) -> Self {
        if boxed.is_empty() {
            Self::empty()
        } else {
            Self { data: Some(boxed) }
        }
    }
}

impl<T> From<Vec<T>> for RawBuffer<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from(vec.into_boxed_slice())
    }
}

/// Copy-assign `len` elements from `src` into `dst`.
///
/// Each `dst[i]` is assigned with `clone_from(&src[i])`, so the
/// destination elements must already be initialised. No-op if `len == 0`.
///
/// # Safety
///
/// When `len > 0`: `dst` must be valid for reads and writes of `len`
/// initialised elements, `src` valid for reads of `len` initialised
/// elements, and the two ranges must not overlap.
pub unsafe fn copy_to_raw_pointer<T: Clone>(dst: *mut T, src: *const T, len: usize) {
    if len == 0 {
        return;
    }
    // SAFETY: both ranges are valid for `len` elements and disjoint, per
    // the caller contract, so the two slices do not alias.
    let (dst, src) = unsafe {
        (
            std::slice::from_raw_parts_mut(dst, len),
            std::slice::from_raw_parts(src, len),
        )
    };
    crate::transfer::copy_elements(dst, src);
}

/// Move `len` elements from `src` into `dst`, leaving each `src[i]` in
/// its `Default` (moved-from) state.
///
/// # Safety
///
/// Same contract as [`copy_to_raw_pointer`], with `src` also valid for
/// writes.
pub unsafe fn move_to_raw_pointer<T: Default>(dst: *mut T, src: *mut T, len: usize) {
    if len == 0 {
        return;
    }
    // SAFETY: both ranges are valid for `len` elements and disjoint, per
    // the caller contract.
    let (dst, src) = unsafe {
        (
            std::slice::from_raw_parts_mut(dst, len),
            std::slice::from_raw_parts_mut(src, len),
        )
    };
    crate::transfer::move_elements(dst, src);
}

/// Allocate a deep copy of `len` elements starting at `src`.
///
/// Returns an empty buffer if `src` is null or `len == 0`. The source is
/// left untouched.
///
/// # Safety
///
/// When `src` is non-null and `len > 0`, `src` must be valid for reads of
/// `len` initialised elements. The length is trusted, not verified.
pub unsafe fn allocate_from_raw_pointer<T: Clone>(src: *const T, len: usize) -> RawBuffer<T> {
    if src.is_null() || len == 0 {
        return RawBuffer::empty();
    }
    // SAFETY: the caller guarantees `src` points at `len` initialised
    // elements that outlive this call.
    let src = unsafe { std::slice::from_raw_parts(src, len) };
    allocate_from_slice(src)
}
