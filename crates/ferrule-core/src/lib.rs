//! Core types and traits for the Ferrule buffer library.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! error taxonomy and the [`BufferHandle`] capability trait implemented by
//! every handle kind in `ferrule-handle`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod traits;

pub use error::BufferError;
pub use traits::BufferHandle;
