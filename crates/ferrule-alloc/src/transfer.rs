//! Elementwise copy and move between initialised buffers.
//!
//! Both functions transfer `src.len()` elements into the front of `dst`.
//! A `dst` shorter than `src` panics on the slice bound.

/// Copy-assign every element of `src` into the front of `dst`.
///
/// Uses `Clone::clone_from`, so element types that can reuse their own
/// storage (e.g. `String`, `Vec`) do so.
///
/// # Panics
///
/// Panics if `dst.len() < src.len()`.
pub fn copy_elements<T: Clone>(dst: &mut [T], src: &[T]) {
    dst[..src.len()].clone_from_slice(src);
}

/// Move every element of `src` into the front of `dst`.
///
/// Each source element is left in its `Default` state. The previous
/// destination values are dropped.
///
/// # Panics
///
/// Panics if `dst.len() < src.len()`.
pub fn move_elements<T: Default>(dst: &mut [T], src: &mut [T]) {
    let dst = &mut dst[..src.len()];
    for (d, s) in dst.iter_mut().zip(src.iter_mut()) {
        *d = std::mem::take(s);
    }
}
