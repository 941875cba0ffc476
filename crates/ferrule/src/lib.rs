//! Ferrule: exclusively owned and reference-counted heap buffers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Ferrule sub-crates. For most users, adding `ferrule` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ferrule::prelude::*;
//!
//! // One owner: clone is a deep copy.
//! let mut exclusive: ExclusiveHandle<u32> = ExclusiveHandle::with_len(4);
//! exclusive[0] = 7;
//! let copy = exclusive.clone();
//! assert_ne!(copy.as_ptr(), exclusive.as_ptr());
//!
//! // Many owners: clone bumps an atomic count.
//! let shared = SharedHandle::from(exclusive);
//! let alias = shared.clone();
//! assert!(alias.ptr_eq(&shared));
//! assert_eq!(shared.use_count(), 2);
//!
//! // Moving out leaves the source unallocated.
//! let mut source = alias;
//! let moved = source.take();
//! assert!(!source.is_valid());
//! assert_eq!(moved.use_count(), 2);
//!
//! // Empty handles never allocate.
//! let empty: SharedHandle<u32> = SharedHandle::with_len(0);
//! assert!(empty.as_ptr().is_null());
//! assert_eq!(empty.first(), Err(BufferError::InvalidAccess { index: 0, len: 0 }));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ferrule-core` | `BufferError`, the `BufferHandle` trait |
//! | [`alloc`] | `ferrule-alloc` | `RawBuffer`, allocation and elementwise copy/move |
//! | [`handle`] | `ferrule-handle` | `ExclusiveHandle`, `SharedHandle` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error taxonomy and the capability trait (`ferrule-core`).
pub use ferrule_core as types;

/// Allocation primitives and owned raw buffers (`ferrule-alloc`).
///
/// Container code that manages its own storage builds on these rather
/// than duplicating copy, move, or release logic.
pub use ferrule_alloc as alloc;

/// Exclusive and shared buffer handles (`ferrule-handle`).
pub use ferrule_handle as handle;

/// Common imports for typical usage.
///
/// ```rust
/// use ferrule::prelude::*;
/// ```
pub mod prelude {
    pub use ferrule_alloc::{allocate, allocate_from_slice, allocate_one, allocate_with, RawBuffer};
    pub use ferrule_core::{BufferError, BufferHandle};
    pub use ferrule_handle::{ExclusiveHandle, SharedHandle};
}
