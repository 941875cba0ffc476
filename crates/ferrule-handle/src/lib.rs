//! Buffer handles for Ferrule.
//!
//! Two ownership kinds over the same allocation primitives:
//!
//! - [`ExclusiveHandle`]: one owner per buffer. Clone deep-copies.
//! - [`SharedHandle`]: many owners per buffer, tracked by an atomic
//!   count. Clone aliases; the last handle to go releases the buffer.
//!
//! Both implement [`BufferHandle`](ferrule_core::BufferHandle). Both are
//! unallocated when empty: a zero-length handle holds no buffer and, for
//! [`SharedHandle`], no count.
//!
//! Moving a buffer out of a handle is [`BufferHandle::take`](ferrule_core::BufferHandle::take);
//! the source is left unallocated and nothing is copied or counted.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod exclusive;
pub mod shared;

pub use exclusive::ExclusiveHandle;
pub use shared::SharedHandle;
