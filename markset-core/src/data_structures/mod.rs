//! Data structures for concurrent sets.
//!
//! # Organization
//!
//! - [`sorted`] - Lock-free ordered list (HarrisList)
//! - [`set`] - The `Set` capability interface
//! - [`key`] - Ordering keys and key derivation
//! - [`internal`] - Atomic marked-reference primitive

pub mod internal;
pub mod key;
pub mod set;
pub mod sorted;

pub use internal::AtomicMarkableRef;
pub use key::{Hashed, Key, MAX_KEY, MIN_KEY, SetKey, is_item_key};
pub use set::Set;
pub use sorted::{HarrisList, ListNode};
