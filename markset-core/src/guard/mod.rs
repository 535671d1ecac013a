//! Guard trait for memory reclamation strategies.
//!
//! A node unlinked from a `HarrisList` may still be referenced by a thread
//! that read it a moment before the unlink (as `curr` inside a search). It
//! therefore cannot be freed by the thread that unlinked it. The `Guard`
//! trait abstracts over how such nodes are retired and when they are freed.
//!
//! # Design
//!
//! ```text
//! HarrisList<T, G: Guard>
//!     │
//!     ├── HarrisList<T, EpochGuard>      (production, markset-crossbeam)
//!     └── HarrisList<T, DeferredGuard>   (testing)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use markset_core::{DeferredGuard, HarrisList, Set};
//! use markset_crossbeam::EpochGuard;
//!
//! // Production: epoch-based reclamation
//! let set: HarrisList<i32, EpochGuard> = HarrisList::new();
//! set.add(42);
//!
//! // Testing: deferred destruction
//! let test_set: HarrisList<i32, DeferredGuard> = HarrisList::new();
//! ```

mod deferred_guard;

use std::ops::Deref;

pub use deferred_guard::{DeferredGuard, DeferredRef};

/// A memory reclamation guard that protects concurrent access to nodes.
///
/// - **EpochGuard**: Low overhead, batched reclamation (crossbeam-epoch)
/// - **DeferredGuard**: Defers all destruction until the guard drops (testing)
///
/// # Safety Contract
///
/// Implementations must ensure:
/// 1. Nodes passed to `defer_destroy` are not freed while any `ReadGuard`
///    pinned before the call is alive
/// 2. `GuardedRef` keeps the referenced data valid for its lifetime
///
/// The guard stored in a collection schedules destruction. Thread pinning
/// happens per operation through [`Guard::pin`].
///
pub trait Guard: Sized + Default + Send + Sync {
    /// A reference protected by a guard of this type.
    type GuardedRef<'a, T: 'a>: Deref<Target = T>;

    /// An active guard that protects reads for its lifetime.
    ///
    /// For epoch-based guards this is a pinned `crossbeam_epoch::Guard`.
    /// For deferred guards it is `()`.
    ///
    type ReadGuard: Sized;

    /// Pin an active read guard for the duration of one operation.
    fn pin() -> Self::ReadGuard;

    /// Schedule a node for deferred destruction.
    ///
    /// The node may be dropped on any thread, long after the caller returns.
    ///
    /// # Safety
    ///
    /// - `node` must be a valid pointer previously allocated by the collection
    /// - `node` must be unlinked (not reachable by any new traversal)
    /// - `node` must be retired exactly once
    /// - `dealloc` must be the correct deallocation function for `node`
    ///
    unsafe fn defer_destroy<N: Send + 'static>(&self, node: *mut N, dealloc: unsafe fn(*mut N));

    /// Create a guarded reference from a raw pointer.
    ///
    /// # Safety
    ///
    /// - `ptr` must point to valid data protected by some guard
    /// - The data must remain valid for lifetime `'a`
    ///
    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T>;
}
