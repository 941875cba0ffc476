//! Reference-counted shared buffers.
//!
//! A [`SharedHandle`] aliases one buffer with every handle cloned from
//! it. The count lives in a small `Arc` node that points at the boxed
//! elements, so adopting a buffer keeps its allocation in place. The
//! count is updated with atomic fetch-add/fetch-sub, and the handle whose
//! decrement observes the last reference drops the elements and frees
//! both the buffer and the node.
//!
//! Per-buffer states:
//!
//! ```text
//! Unallocated ──with_len / from_* (len > 0)──► Allocated(1)
//! Allocated(k) ──clone──────────────────────► Allocated(k + 1)
//! Allocated(k) ──drop / free (k > 1)────────► Allocated(k - 1)
//! Allocated(1) ──drop / free────────────────► released
//! take: the count is carried over unchanged; the source becomes Unallocated.
//! ```

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use ferrule_alloc::{allocate, allocate_from_slice, allocate_with, try_allocate, RawBuffer};
use ferrule_core::{BufferError, BufferHandle};

use crate::exclusive::ExclusiveHandle;

/// Shared owner of a heap buffer of `T`, or of nothing.
///
/// `SharedHandle<T>` is `Send + Sync` exactly when `T` is. Distinct
/// handles aliasing one buffer may be cloned, taken, and dropped from
/// different threads concurrently. Element data is only reachable
/// mutably through [`get_mut`](BufferHandle::get_mut) and
/// [`make_mut`](SharedHandle::make_mut), which require the handle to be
/// the sole owner.
pub struct SharedHandle<T> {
    data: Option<Arc<Box<[T]>>>,
}

impl<T> SharedHandle<T> {
    /// An unallocated handle.
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// A handle owning `len` default-constructed elements, count 1.
    ///
    /// `len == 0` yields an unallocated handle.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_raw_buffer(allocate(len))
    }

    /// Fallible [`with_len`](Self::with_len).
    ///
    /// Failure to allocate the elements is reported as
    /// [`BufferError::AllocationFailed`] or
    /// [`BufferError::CapacityOverflow`]. The fixed-size count node is
    /// allocated infallibly afterwards.
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

    /// Deep-copy `src` into a new buffer with count 1.
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

    /// Adopt `buf` with count 1.
    ///
    /// The buffer stays where it is: `as_ptr()` afterwards equals
    /// `buf.as_ptr()`. Only the count node is allocated.
    pub fn from_raw_buffer(buf: RawBuffer<T>) -> Self {
        Self {
            data: buf.into_boxed_slice().map(Arc::new),
        }
    }

    /// Number of live handles aliasing this buffer, or 0 if unallocated.
    ///
    /// Other threads may change the count at any moment; the value is a
    /// snapshot.
    pub fn use_count(&self) -> usize {
        self.data.as_ref().map_or(0, Arc::strong_count)
    }

    /// Whether this is the only handle to its buffer.
    pub fn is_unique(&self) -> bool {
        self.use_count() == 1
    }

    /// Whether both handles alias the same buffer.
    ///
    /// Two unallocated handles share nothing and compare `false`.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Mutable access, detaching into a private copy first if the buffer
    /// is shared.
    ///
    /// Other handles keep the old buffer. Returns `None` only when the
    /// handle is unallocated.
    pub fn make_mut(&mut self) -> Option<&mut [T]>
    where
        T: Clone,
    {
        let shared = self
            .data
            .as_mut()
            .is_some_and(|data| Arc::get_mut(data).is_none());
        if shared {
            *self = Self::from_slice(self.as_slice());
        }
        BufferHandle::get_mut(self)
    }

    /// Deep-copy into an exclusively owned buffer.
    pub fn to_exclusive(&self) -> ExclusiveHandle<T>
    where
        T: Clone,
    {
        ExclusiveHandle::from_handle(self)
    }

    /// The elements, or an empty slice if unallocated.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_deref().map(|boxed| &boxed[..]).unwrap_or(&[])
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> BufferHandle for SharedHandle<T> {
    type Elem = T;

    fn as_slice(&self) -> &[T] {
        SharedHandle::as_slice(self)
    }

    /// `None` unless this handle is the sole owner.
    fn get_mut(&mut self) -> Option<&mut [T]> {
        self.data
            .as_mut()
            .and_then(Arc::get_mut)
            .map(|boxed| &mut boxed[..])
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

impl<T> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }

    /// Releases the current buffer before joining `source`'s. A no-op if
    /// both already alias the same buffer, so the count never passes
    /// through a spurious release.
    fn clone_from(&mut self, source: &Self) {
        if self.ptr_eq(source) {
            return;
        }
        self.data = None;
        self.data = source.data.clone();
    }
}

impl<T> Default for SharedHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("len", &self.as_slice().len())
            .field("use_count", &self.use_count())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for SharedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for SharedHandle<T> {}

impl<T> Index<usize> for SharedHandle<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(elem) => elem,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> AsRef<[T]> for SharedHandle<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> From<RawBuffer<T>> for SharedHandle<T> {
    fn from(buf: RawBuffer<T>) -> Self {
        Self::from_raw_buffer(buf)
    }
}

impl<T> From<Box<[T]>> for SharedHandle<T> {
    fn from(boxed: Box<[T]>) -> Self {
        Self::from_raw_buffer(RawBuffer::from(boxed))
    }
}

impl<T> From<Vec<T>> for SharedHandle<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_raw_buffer(RawBuffer::from(vec))
    }
}

impl<T> From<ExclusiveHandle<T>> for SharedHandle<T> {
    fn from(handle: ExclusiveHandle<T>) -> Self {
        Self::from_raw_buffer(handle.into_raw_buffer())
    }
}

impl<'a, T> IntoIterator for &'a SharedHandle<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Element that bumps a shared counter when dropped.
    struct Dropper(Arc<AtomicUsize>);

    impl Drop for Dropper {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shared_handle_is_send_and_sync() {
        assert_send_sync::<SharedHandle<u64>>();
        assert_send_sync::<SharedHandle<String>>();
    }

    #[test]
    fn new_has_no_counter() {
        let h: SharedHandle<u8> = SharedHandle::new();
        assert!(!h.is_valid());
        assert_eq!(h.use_count(), 0);
        assert!(h.as_ptr().is_null());
    }

    #[test]
    fn zero_len_never_counts() {
        let h: SharedHandle<u32> = SharedHandle::with_len(0);
        let c = h.clone();
        assert_eq!(h.use_count(), 0);
        assert_eq!(c.use_count(), 0);
        assert_eq!(c.size_bytes(), 0);
        assert!(!h.ptr_eq(&c));
    }

    #[test]
    fn with_len_starts_at_one() {
        let h: SharedHandle<u32> = SharedHandle::with_len(5);
        assert_eq!(h.use_count(), 1);
        assert!(h.is_unique());
        assert_eq!(h.as_slice(), &[0; 5]);
    }

    #[test]
    fn clone_aliases_and_counts() {
        let h: SharedHandle<u32> = SharedHandle::with_len(3);
        let c = h.clone();
        assert!(h.ptr_eq(&c));
        assert_eq!(h.as_ptr(), c.as_ptr());
        assert_eq!(h.use_count(), 2);
        drop(c);
        assert_eq!(h.use_count(), 1);
    }

    #[test]
    fn take_carries_the_count() {
        let mut h: SharedHandle<u32> = SharedHandle::with_len(3);
        let other = h.clone();
        let addr = h.as_ptr();
        let moved = h.take();
        assert!(!h.is_valid());
        assert_eq!(h.use_count(), 0);
        assert_eq!(moved.as_ptr(), addr);
        assert_eq!(moved.use_count(), 2);
        assert_eq!(other.use_count(), 2);
    }

    #[test]
    fn free_decrements_and_empties() {
        let mut h: SharedHandle<u32> = SharedHandle::with_len(2);
        let keep = h.clone();
        h.free();
        assert!(!h.is_valid());
        assert_eq!(keep.use_count(), 1);
        h.free();
        assert_eq!(keep.use_count(), 1);
    }

    #[test]
    fn clone_from_alias_is_noop() {
        let mut h: SharedHandle<u32> = SharedHandle::with_len(2);
        let alias = h.clone();
        let addr = h.as_ptr();
        h.clone_from(&alias);
        assert_eq!(h.as_ptr(), addr);
        assert_eq!(h.use_count(), 2);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn clone_from_other_releases_old_buffer() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut h = SharedHandle::from_fn(3, |_| Dropper(Arc::clone(&drops)));
        let other = SharedHandle::from_fn(1, |_| Dropper(Arc::clone(&drops)));
        h.clone_from(&other);
        assert_eq!(drops.load(Ordering::Relaxed), 3);
        assert!(h.ptr_eq(&other));
        assert_eq!(other.use_count(), 2);
    }

    #[test]
    fn last_release_drops_elements_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let h = SharedHandle::from_fn(5, |_| Dropper(Arc::clone(&drops)));
        let copies: Vec<_> = (0..8).map(|_| h.clone()).collect();
        assert_eq!(h.use_count(), 9);
        drop(h);
        assert_eq!(drops.load(Ordering::Relaxed), 0);
        drop(copies);
        assert_eq!(drops.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn concurrent_clones_are_all_counted() {
        let h: SharedHandle<u64> = SharedHandle::with_len(16);
        let copies: Vec<SharedHandle<u64>> = thread::scope(|s| {
            let workers: Vec<_> = (0..8).map(|_| s.spawn(|| h.clone())).collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(h.use_count(), 9);
        thread::scope(|s| {
            for c in copies {
                s.spawn(move || drop(c));
            }
        });
        assert_eq!(h.use_count(), 1);
    }

    #[test]
    fn get_mut_requires_uniqueness() {
        let mut h: SharedHandle<u8> = SharedHandle::with_len(2);
        assert!(h.get_mut().is_some());
        let alias = h.clone();
        assert!(h.get_mut().is_none());
        assert!(h.as_mut_ptr().is_null());
        // Still allocated: only mutable access is refused.
        assert!(h.is_valid());
        assert!(!h.as_ptr().is_null());
        drop(alias);
        h.get_mut().unwrap()[0] = 9;
        assert_eq!(h[0], 9);
    }

    #[test]
    fn make_mut_detaches_shared_buffer() {
        let mut h = SharedHandle::from(vec![1u8, 2, 3]);
        let alias = h.clone();
        h.make_mut().unwrap()[0] = 42;
        assert!(!h.ptr_eq(&alias));
        assert_eq!(h.as_slice(), &[42, 2, 3]);
        assert_eq!(alias.as_slice(), &[1, 2, 3]);
        assert_eq!(h.use_count(), 1);
        assert_eq!(alias.use_count(), 1);
    }

    #[test]
    fn make_mut_on_unique_keeps_buffer() {
        let mut h = SharedHandle::from(vec![1u8]);
        let addr = h.as_ptr();
        h.make_mut().unwrap()[0] = 2;
        assert_eq!(h.as_ptr(), addr);
        let mut empty: SharedHandle<u8> = SharedHandle::new();
        assert!(empty.make_mut().is_none());
    }

    #[test]
    fn adopt_keeps_the_allocation() {
        let buf = allocate::<u64>(1_024);
        let addr = buf.as_ptr();
        let h = SharedHandle::from_raw_buffer(buf);
        assert_eq!(h.as_ptr(), addr);
        assert_eq!(h.len(), 1_024);
        assert_eq!(h.use_count(), 1);
    }

    #[test]
    fn from_exclusive_keeps_the_allocation() {
        let ex = ExclusiveHandle::from_fn(16, |i| i as u32);
        let addr = ex.as_ptr();
        let h = SharedHandle::from(ex);
        assert_eq!(h.as_ptr(), addr);
        let alias = h.clone();
        assert_eq!(alias.as_ptr(), addr);
    }

    #[test]
    fn try_with_len_allocates() {
        let h: SharedHandle<u32> = SharedHandle::try_with_len(4).unwrap();
        assert_eq!(h.len(), 4);
        assert_eq!(h.use_count(), 1);
        assert_eq!(h.as_slice(), &[0; 4]);
    }

    #[test]
    fn try_with_len_zero_is_unallocated() {
        let h: SharedHandle<u32> = SharedHandle::try_with_len(0).unwrap();
        assert!(!h.is_valid());
        assert_eq!(h.use_count(), 0);
    }

    #[test]
    fn try_with_len_reports_overflow() {
        let err = SharedHandle::<u64>::try_with_len(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            BufferError::CapacityOverflow {
                len: usize::MAX,
                elem_size: 8
            }
        );
    }

    #[test]
    fn try_with_len_reports_refused_request() {
        // Fits in isize::MAX bytes but no allocator will satisfy it.
        let len = (isize::MAX as usize) / 2;
        let err = SharedHandle::<u8>::try_with_len(len).unwrap_err();
        assert_eq!(err, BufferError::AllocationFailed { len, bytes: len });
    }

    #[test]
    fn from_exclusive_moves_elements() {
        let ex = ExclusiveHandle::from(vec![String::from("a"), String::from("b")]);
        let sh = SharedHandle::from(ex);
        assert_eq!(sh.use_count(), 1);
        assert_eq!(sh.as_slice(), ["a", "b"]);
        let back = sh.to_exclusive();
        assert_ne!(back.as_ptr(), sh.as_ptr());
        assert_eq!(back.as_slice(), sh.as_slice());
    }

    #[test]
    #[should_panic(expected = "empty buffer")]
    fn index_on_unallocated_panics() {
        let h: SharedHandle<i32> = SharedHandle::new();
        let _first = h[0];
    }

    #[test]
    fn first_on_unallocated_is_an_error() {
        let h: SharedHandle<i32> = SharedHandle::new();
        assert!(h.as_ptr().is_null());
        assert_eq!(
            h.first(),
            Err(BufferError::InvalidAccess { index: 0, len: 0 })
        );
    }

    #[test]
    fn equality_is_elementwise() {
        let a = SharedHandle::from(vec![1, 2]);
        let b = SharedHandle::from(vec![1, 2]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_eq!(SharedHandle::<i32>::new(), SharedHandle::new());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn count_tracks_live_handles(len in 1usize..32, copies in 0usize..24) {
                let h: SharedHandle<u32> = SharedHandle::with_len(len);
                let mut live: Vec<_> = (0..copies).map(|_| h.clone()).collect();
                prop_assert_eq!(h.use_count(), copies + 1);
                while let Some(c) = live.pop() {
                    drop(c);
                    prop_assert_eq!(h.use_count(), live.len() + 1);
                }
            }

            #[test]
            fn take_keeps_address_and_count(len in 1usize..64, extra in 0usize..4) {
                let mut h: SharedHandle<u16> = SharedHandle::with_len(len);
                let _aliases: Vec<_> = (0..extra).map(|_| h.clone()).collect();
                let addr = h.as_ptr();
                let moved = h.take();
                prop_assert!(h.as_ptr().is_null());
                prop_assert_eq!(h.len(), 0);
                prop_assert_eq!(moved.as_ptr(), addr);
                prop_assert_eq!(moved.len(), len);
                prop_assert_eq!(moved.use_count(), extra + 1);
            }
        }
    }
}
