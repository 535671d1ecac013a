//! Lock-free ordered set built on Harris's marked linked list.
//!
//! ```rust,ignore
//! use markset_core::{DeferredGuard, HarrisList, Set};
//!
//! let set: HarrisList<i32, DeferredGuard> = HarrisList::new();
//! assert!(set.add(1));
//! assert!(!set.add(1));
//! assert!(set.remove(&1));
//! ```

pub mod common_tests;
pub mod data_structures;
pub mod guard;

// Re-export the main types for convenience
pub use data_structures::{
    AtomicMarkableRef, HarrisList, Hashed, Key, ListNode, MAX_KEY, MIN_KEY, Set, SetKey,
};
pub use guard::{DeferredGuard, DeferredRef, Guard};

/*

Loom model tests:

RUSTFLAGS="--cfg loom" cargo test -p markset-core --test loom_harris_list --release

*/
