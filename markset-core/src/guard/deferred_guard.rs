//! Deferred guard implementation for testing.
//!
//! `DeferredGuard` keeps every retired node alive until the guard itself is
//! dropped, which for a `HarrisList` means until the list is dropped.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Mutex;

use tracing::debug;

use super::Guard;

/// A guard that defers all node destruction until it is dropped.
///
/// Retirement is checked: retiring the same address twice panics, which
/// catches two threads both believing they unlinked the same node.
///
/// Not suitable for long-running sets, memory grows with every removal.
///
pub struct DeferredGuard {
    retired: Mutex<Retired>,
}

#[derive(Default)]
struct Retired {
    nodes: Vec<RetiredNode>,
    addresses: HashSet<usize>,
}

struct RetiredNode {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: only `Send` nodes are retired, the pointer is only dereferenced by
// `dealloc` when the guard drops, and all access goes through the Mutex.
unsafe impl Send for RetiredNode {}

impl DeferredGuard {
    pub fn new() -> Self {
        DeferredGuard {
            retired: Mutex::new(Retired::default()),
        }
    }

    /// Number of nodes retired so far and waiting for the guard to drop.
    pub fn retired_count(&self) -> usize {
        self.lock().nodes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Retired> {
        // A panic while holding the lock leaves the list consistent; keep going.
        self.retired
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        let retired = self
            .retired
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let count = retired.nodes.len();
        for node in retired.nodes.drain(..) {
            unsafe {
                (node.dealloc)(node.ptr);
            }
        }

        if count > 0 {
            debug!(freed = count, "deferred guard released retired nodes");
        }
    }
}

/// A plain reference wrapper for DeferredGuard.
///
/// Retired nodes outlive every reference handed out by the owning collection,
/// so no extra protection is needed.
///
pub struct DeferredRef<'a, T> {
    data: &'a T,
}

impl<'a, T> DeferredRef<'a, T> {
    pub fn new(data: &'a T) -> Self {
        DeferredRef { data }
    }
}

impl<T> Deref for DeferredRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl Guard for DeferredGuard {
    type GuardedRef<'a, T: 'a> = DeferredRef<'a, T>;

    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N: Send + 'static>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        let mut retired = self.lock();

        let addr = node as usize;
        if !retired.addresses.insert(addr) {
            panic!("node {:#x} retired twice", addr);
        }

        retired.nodes.push(RetiredNode {
            ptr: node as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        });
    }

    unsafe fn make_ref<'a, T: 'a>(ptr: *const T) -> Self::GuardedRef<'a, T> {
        // Safety: caller guarantees ptr is valid for lifetime 'a
        DeferredRef::new(unsafe { &*ptr })
    }
}
