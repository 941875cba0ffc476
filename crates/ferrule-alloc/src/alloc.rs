//! Buffer allocation.
//!
//! Every function returns a [`RawBuffer`]. A request for zero elements
//! never touches the allocator and yields an empty buffer. The infallible
//! functions abort through the global allocator's error handler on heap
//! exhaustion; the `try_*` functions report it as a [`BufferError`].

use std::alloc::Layout;

use ferrule_core::{BufferError, BufferHandle};

use crate::raw::RawBuffer;

/// Allocate `len` default-constructed elements.
pub fn allocate<T: Default>(len: usize) -> RawBuffer<T> {
    allocate_with(len, |_| T::default())
}

/// Allocate `len` elements, constructing element `i` with `f(i)`.
///
/// If `f` panics, the elements constructed so far are dropped and no
/// buffer is produced.
pub fn allocate_with<T, F>(len: usize, f: F) -> RawBuffer<T>
where
    F: FnMut(usize) -> T,
{
    if len == 0 {
        return RawBuffer::empty();
    }
    let mut data = Vec::with_capacity(len);
    data.extend((0..len).map(f));
    RawBuffer::from(data)
}

/// Allocate a single element holding `value`.
pub fn allocate_one<T>(value: T) -> RawBuffer<T> {
    RawBuffer::from(vec![value])
}

/// Allocate a deep copy of `src`.
pub fn allocate_from_slice<T: Clone>(src: &[T]) -> RawBuffer<T> {
    if src.is_empty() {
        return RawBuffer::empty();
    }
    RawBuffer::from(src.to_vec())
}

/// Allocate a deep copy of whatever buffer `src` refers to.
///
/// Works across handle kinds: the length and contents come from the
/// [`BufferHandle`] interface alone.
pub fn allocate_from_handle<H>(src: &H) -> RawBuffer<H::Elem>
where
    H: BufferHandle,
    H::Elem: Clone,
{
    allocate_from_slice(src.as_slice())
}

/// Fallible [`allocate`].
pub fn try_allocate<T: Default>(len: usize) -> Result<RawBuffer<T>, BufferError> {
    let mut data = try_reserve::<T>(len)?;
    data.resize_with(len, T::default);
    Ok(RawBuffer::from(data))
}

/// Fallible [`allocate_from_slice`].
pub fn try_allocate_from_slice<T: Clone>(src: &[T]) -> Result<RawBuffer<T>, BufferError> {
    let mut data = try_reserve::<T>(src.len())?;
    data.extend_from_slice(src);
    Ok(RawBuffer::from(data))
}

/// Reserve exactly `len` elements, mapping both failure modes.
fn try_reserve<T>(len: usize) -> Result<Vec<T>, BufferError> {
    let layout = Layout::array::<T>(len).map_err(|_| BufferError::CapacityOverflow {
        len,
        elem_size: std::mem::size_of::<T>(),
    })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| BufferError::AllocationFailed {
            len,
            bytes: layout.size(),
        })?;
    Ok(data)
}
