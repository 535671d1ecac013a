//! Internal implementation details.
//!
//! `MarkedPtr` stays private to the module; `AtomicMarkableRef` is public because it is the
//! node field type and is useful on its own.

pub mod marked_ptr;

pub(crate) use marked_ptr::contention_hint;
pub use marked_ptr::AtomicMarkableRef;
