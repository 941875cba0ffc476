//! Exclusively owned buffers.
//!
//! An [`ExclusiveHandle`] owns at most one buffer. Cloning deep-copies
//! the elements, so no two handles ever refer to the same allocation.

use std::fmt;
use std::ops::{Index, IndexMut};

use ferrule_alloc::{allocate, allocate_from_slice, allocate_with, try_allocate, RawBuffer};
use ferrule_core::{BufferError, BufferHandle};

/// Sole owner of a heap buffer of `T`, or of nothing.
///
/// Dropping the handle drops every element and releases the buffer.
/// Moving out with [`take`](BufferHandle::take) hands the same
/// allocation to a new handle and leaves this one unallocated.
///
/// Indexing an unallocated handle, or past its end, panics with
/// [`BufferError::InvalidAccess`]. Use [`BufferHandle::get`] to check
/// instead.
#[derive(PartialEq, Eq, Hash)]
pub struct ExclusiveHandle<T> {
    data: Option<Box<[T]>>,
}

impl<T> ExclusiveHandle<T> {
    /// An unallocated handle.
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// A handle owning `len` default-constructed elements.
    ///
    /// `len == 0` yields an unallocated handle.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_raw_buffer(allocate(len))
    }

    /// Fallible [`with_len`](Self::with_len).
    pub fn try_with_len(len: usize) -> Result<Self, BufferError>
    where
        T: Default,
    {
        try_allocate(len).map(Self::from_raw_buffer)
    }

    /// A handle owning `len` elements built by `f(index)`.
    pub fn from_fn<F>(len: usize, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        Self::from_raw_buffer(allocate_with(len, f))
    }

    /// Deep-copy `src` into a new buffer. The source is untouched.
    pub fn from_slice(src: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_raw_buffer(allocate_from_slice(src))
    }

    /// Deep-copy the buffer behind any handle kind.
    pub fn from_handle<H>(src: &H) -> Self
    where
        H: BufferHandle<Elem = T>,
        T: Clone,
    {
        Self::from_slice(src.as_slice())
    }

    /// Adopt an already allocated buffer without copying it.
    ///
    /// To adopt or copy a buffer known only by pointer and length, build
    /// the [`RawBuffer`] first with `RawBuffer::from_raw` or
    /// `allocate_from_raw_pointer`.
    pub fn from_raw_buffer(buf: RawBuffer<T>) -> Self {
        Self {
            data: buf.into_boxed_slice(),
        }
    }

    /// Give the buffer back as a [`RawBuffer`].
    pub fn into_raw_buffer(self) -> RawBuffer<T> {
        match self.data {
            Some(boxed) => RawBuffer::from(boxed),
            None => RawBuffer::empty(),
        }
    }

    /// The elements, or an empty slice if unallocated.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// The elements, mutably. Empty if unallocated.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate mutably over the elements.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T> BufferHandle for ExclusiveHandle<T> {
    type Elem = T;

    fn as_slice(&self) -> &[T] {
        ExclusiveHandle::as_slice(self)
    }

    fn get_mut(&mut self) -> Option<&mut [T]> {
        self.data.as_deref_mut()
    }

    fn take(&mut self) -> Self {
        Self {
            data: self.data.take(),
        }
    }

    fn free(&mut self) {
        self.data = None;
    }

    fn is_valid(&self) -> bool {
        self.data.is_some()
    }
}

impl<T: Clone> Clone for ExclusiveHandle<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }

    /// Copy-assigns element by element when the lengths match, keeping
    /// the existing allocation. Otherwise reallocates.
    fn clone_from(&mut self, source: &Self) {
        if let (Some(dst), Some(src)) = (self.data.as_deref_mut(), source.data.as_deref()) {
            if dst.len() == src.len() {
                ferrule_alloc::copy_elements(dst, src);
                return;
            }
        }
        *self = source.clone();
    }
}

impl<T> Default for ExclusiveHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveHandle")
            .field("len", &self.as_slice().len())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T> Index<usize> for ExclusiveHandle<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(elem) => elem,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<usize> for ExclusiveHandle<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.as_slice().len();
        match self.as_mut_slice().get_mut(index) {
            Some(elem) => elem,
            None => panic!("{}", BufferError::InvalidAccess { index, len }),
        }
    }
}

impl<T> AsRef<[T]> for ExclusiveHandle<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for ExclusiveHandle<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> From<RawBuffer<T>> for ExclusiveHandle<T> {
    fn from(buf: RawBuffer<T>) -> Self {
        Self::from_raw_buffer(buf)
    }
}

impl<T> From<Box<[T]>> for ExclusiveHandle<T> {
    fn from(boxed: Box<[T]>) -> Self {
        Self::from_raw_buffer(RawBuffer::from(boxed))
    }
}

impl<T> From<Vec<T>> for ExclusiveHandle<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_raw_buffer(RawBuffer::from(vec))
    }
}

impl<'a, T> IntoIterator for &'a ExclusiveHandle<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for ExclusiveHandle<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.map(Vec::from).unwrap_or_default().into_iter()
    }
}
