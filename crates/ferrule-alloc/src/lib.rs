//! Allocation primitives for Ferrule buffers.
//!
//! Handles never allocate, copy, or move elements on their own: every
//! buffer is produced here and every elementwise transfer goes through
//! the functions here. This crate is the only one in the workspace that
//! may contain `unsafe` code, confined to the `raw` module.
//!
//! # Layout
//!
//! ```text
//! alloc     allocate / allocate_with / allocate_one / allocate_from_*  → RawBuffer<T>
//! transfer  copy_elements / move_elements                            (slice based)
//! raw       RawBuffer<T>, copy_to_raw_pointer / move_to_raw_pointer /
//!           allocate_from_raw_pointer                               (trusted length)
//! ```
//!
//! A single allocation path serves one element and many: there is no
//! separate single-element allocation to match on release.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod raw;
pub mod transfer;

// Public re-exports for the primary API surface.
pub use alloc::{
    allocate, allocate_from_handle, allocate_from_slice, allocate_one, allocate_with,
    try_allocate, try_allocate_from_slice,
};
pub use raw::{allocate_from_raw_pointer, copy_to_raw_pointer, move_to_raw_pointer, RawBuffer};
pub use transfer::{copy_elements, move_elements};
