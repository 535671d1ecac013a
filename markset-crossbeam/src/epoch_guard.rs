//! Epoch-based guard implementation using crossbeam-epoch.
//!
//! `EpochGuard` is a zero-sized type that schedules destruction using the
//! global epoch collector. A `HarrisList` parameterized with `EpochGuard` gets
//! epoch-based memory reclamation:
//!
//! ```text
//! HarrisList<i32, EpochGuard>
//!     │
//!     ├── every add/remove/contains pins the current thread
//!     └── unlinked nodes are freed once every pinned thread has moved on
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use markset_core::HarrisList;
//! use markset_crossbeam::EpochGuard;
//!
//! let set: HarrisList<i32, EpochGuard> = HarrisList::new();
//!
//! set.add(42);
//! set.add(17);
//!
//! if let Some(val) = set.get(&42) {
//!     println!("Found: {}", *val);
//! }
//!
//! set.remove(&42);
//! ```

use crossbeam_epoch::{self as epoch, Guard as CrossbeamGuard};
use markset_core::guard::Guard;
use std::fmt;
use std::ops::Deref;

/// Epoch-based memory reclamation guard.
///
/// Nodes handed to `defer_destroy` are not freed until every thread that was
/// pinned at that moment has unpinned. Destruction runs on whichever thread
/// next advances the global collector, so stored items should be `Send`.
///
/// - **Pin overhead**: Very low (thread-local check)
/// - **Reclamation**: Batched, amortized O(1) per node
/// - **Memory**: Retired nodes accumulate while any thread stays pinned
///
/// Retired nodes must be `Send + 'static`, so a list of thread-bound items
/// cannot add or remove:
///
/// ```compile_fail
/// use std::marker::PhantomData;
/// use markset_core::{HarrisList, SetKey};
/// use markset_crossbeam::EpochGuard;
///
/// struct Local(i32, PhantomData<*const ()>);
///
/// impl SetKey for Local {
///     fn set_key(&self) -> i64 {
///         i64::from(self.0)
///     }
/// }
///
/// let list: HarrisList<Local, EpochGuard> = HarrisList::new();
/// list.add(Local(1, PhantomData));
/// ```
///
/// The same item made `Send` is accepted:
///
/// ```
/// use markset_core::{HarrisList, SetKey};
/// use markset_crossbeam::EpochGuard;
///
/// struct Local(i32);
///
/// impl SetKey for Local {
///     fn set_key(&self) -> i64 {
///         i64::from(self.0)
///     }
/// }
///
/// let list: HarrisList<Local, EpochGuard> = HarrisList::new();
/// assert!(list.add(Local(1)));
/// assert!(list.remove(&Local(1)));
/// ```
///
#[derive(Clone, Copy, Default, Debug)]
pub struct EpochGuard {
    // Zero-sized - all state is in the global epoch collector
}

impl EpochGuard {
    pub fn new() -> Self {
        EpochGuard {}
    }

    /// Push this thread's pending destructions to the global collector.
    ///
    /// Useful in tests and benchmarks that want retired nodes to be freed
    /// promptly instead of at the next natural collection.
    pub fn flush() {
        epoch::pin().flush();
    }
}

/// A reference protected by an epoch guard.
///
/// The reference cannot outlive the pinned guard it carries. Dropping the
/// `EpochRef` unpins the thread.
///
pub struct EpochRef<'a, T> {
    _guard: CrossbeamGuard,
    reference: &'a T,
}

impl<'a, T> EpochRef<'a, T> {
    /// # Safety
    ///
    /// - The reference must point to valid data
    /// - The data must not be freed while `guard` is pinned
    ///
    pub(crate) unsafe fn new(guard: CrossbeamGuard, reference: &'a T) -> Self {
        EpochRef {
            _guard: guard,
            reference,
        }
    }

    pub fn get(&self) -> &T {
        self.reference
    }
}

impl<T> Deref for EpochRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.reference
    }
}

impl<T: fmt::Display> fmt::Display for EpochRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

impl<T: fmt::Debug> fmt::Debug for EpochRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpochRef({:?})", self.reference)
    }
}

impl Guard for EpochGuard {
    type GuardedRef<'a, T: 'a> = EpochRef<'a, T>;

    /// A pinned crossbeam guard held for the duration of one list operation.
    type ReadGuard = CrossbeamGuard;

    fn pin() -> Self::ReadGuard {
        epoch::pin()
    }

    unsafe fn defer_destroy<N: Send + 'static>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        // The retiring thread is already pinned by its list operation; pinning
        // again is re-entrant and only needed to reach the collector.
        let guard = epoch::pin();
        unsafe {
            guard.defer_unchecked(move || {
                dealloc(node);
            });
        }
    }

    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T> {
        // A fresh pin keeps the data alive after the operation's own pin drops.
        let new_guard = epoch::pin();
        unsafe { EpochRef::new(new_guard, &*ptr) }
    }
}
