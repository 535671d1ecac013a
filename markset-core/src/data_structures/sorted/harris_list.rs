use std::fmt;
use std::ptr;

use tracing::{debug, trace};

use crate::data_structures::internal::contention_hint;
use crate::data_structures::{AtomicMarkableRef, Key, MAX_KEY, MIN_KEY, Set, SetKey, is_item_key};
use crate::guard::Guard;

type NodePtr<T> = *mut ListNode<T>;

///
/// Lock-free ordered set based on Harris's paper 'A Pragmatic Implementation of
/// Non-Blocking Linked-Lists'.
///
// =============================================================================
// LIST INVARIANTS
// =============================================================================
//
// ┌──────┐    ┌──────┐    ┌──────┐    ┌──────┐
// │ HEAD │───►│  10  │───►│  20  │───►│ TAIL │
// │ MIN  │    │      │    │      │    │ MAX  │
// └──────┘    └──────┘    └──────┘    └──────┘
//
// 1. Keys strictly ascend from HEAD (MIN_KEY) to TAIL (MAX_KEY)
// 2. Unmarked keys are unique
// 3. A mark is never cleared; a marked node's next pointer never changes
// 4. HEAD and TAIL are never marked or removed
// 5. An unmarked node is always reachable from HEAD
//
// =============================================================================
// REMOVE (Two-Phase Delete)
// =============================================================================
//
// Phase 1: LOGICAL DELETE - CAS curr.next from (succ, false) to (succ, true)
// Phase 2: PHYSICAL UNLINK - CAS pred.next from (curr, false) to (succ, false)
//
// Before:  pred ──────► curr ──────► succ
//
// Mark:    pred ──────► curr ──╳───► succ
//                              │
//                           (marked)
//
// Unlink:  pred ─────────────────────► succ
//                       curr ──╳───► succ  (unreachable, retired)
//
// Phase 2 is attempted once by the remover. If that CAS loses, the node stays
// linked and the next find() passing over it unlinks it instead.
//
// =============================================================================
// INSERT VS DELETE
// =============================================================================
//
// Insert of X after curr:  CAS curr.next (succ, false) -> (X, false)
// Delete of curr:          CAS curr.next (succ, false) -> (succ, true)
//
// Both target the same word, so at most one of them succeeds. An insert never
// lands after a marked node.
//
// =============================================================================
// RECLAMATION
// =============================================================================
//
// A node is retired by the one thread whose unlink CAS succeeds. Because pred
// must be unmarked for that CAS, and every unmarked node is reachable, each
// node has exactly one reachable predecessor, so at most one unlink can win.
// Retired nodes go to the guard; every public operation pins a read guard so
// nodes it may still touch are not freed underneath it.
//
pub struct ListNode<T> {
    key: Key,
    item: Option<T>,
    next: AtomicMarkableRef<ListNode<T>>,
}

impl<T> ListNode<T> {
    fn new(key: Key, item: T) -> Self {
        ListNode {
            key,
            item: Some(item),
            next: AtomicMarkableRef::new(ptr::null_mut(), false),
        }
    }

    fn new_sentinel(key: Key, next: NodePtr<T>) -> Self {
        ListNode {
            key,
            item: None,
            next: AtomicMarkableRef::new(next, false),
        }
    }

    fn is_sentinel(&self) -> bool {
        self.item.is_none()
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// The stored item; `None` for sentinels.
    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    /// Deallocate a node allocated by the list.
    ///
    /// # Safety
    /// - `ptr` must come from `Box::into_raw` in this module
    /// - Must only be called once, and the node must not be accessed afterwards
    ///
    unsafe fn dealloc_ptr(ptr: *mut Self) {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

impl<T: fmt::Debug> fmt::Debug for ListNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListNode")
            .field("key", &self.key)
            .field("item", &self.item)
            .field("next", &self.next)
            .finish()
    }
}

/// Adjacent nodes around a key: `pred.key < key <= curr.key`.
///
/// Both were unmarked when the search observed them.
///
struct Window<T> {
    pred: NodePtr<T>,
    curr: NodePtr<T>,
}

/// Lock-free ordered set backed by a singly linked list.
///
/// `G` selects the memory reclamation strategy for removed nodes, see
/// [`Guard`].
///
pub struct HarrisList<T, G: Guard> {
    head: NodePtr<T>,
    tail: NodePtr<T>,
    /// Shared guard instance receiving every retired node.
    guard: G,
}

// Safety: nodes are only mutated through atomics. Items are shared between
// threads by reference (`get`) and may be dropped on whichever thread frees
// the node.
unsafe impl<T: Send + Sync, G: Guard> Send for HarrisList<T, G> {}
unsafe impl<T: Send + Sync, G: Guard> Sync for HarrisList<T, G> {}

impl<T, G: Guard> HarrisList<T, G> {
    pub fn new() -> Self {
        let tail = Box::into_raw(Box::new(ListNode::new_sentinel(MAX_KEY, ptr::null_mut())));
        let head = Box::into_raw(Box::new(ListNode::new_sentinel(MIN_KEY, tail)));
        HarrisList {
            head,
            tail,
            guard: G::default(),
        }
    }

    /// Get the shared guard instance for this list.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Visit every unmarked item in key order.
    ///
    /// Reads marks but never repairs. Not atomic across the whole list.
    ///
    fn for_each_item<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let _guard = G::pin();
        let mut curr = unsafe { (*self.head).next.get_reference() };

        while curr != self.tail {
            let node = unsafe { &*curr };
            let (succ, marked) = node.next.load();

            if !marked {
                if let Some(item) = node.item() {
                    f(item);
                }
            }

            curr = succ;
        }
    }

    /// Number of unmarked items at the time each node was visited.
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.for_each_item(|_| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects all unmarked items in key order.
    ///
    /// Diagnostic snapshot: concurrent mutations may or may not be reflected.
    ///
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut items = Vec::new();
        self.for_each_item(|item| items.push(item.clone()));
        items
    }
}

// Everything that can retire a node needs `T: Send + 'static`: a retired item
// may be dropped on any thread at any later time.
impl<T: Send + 'static, G: Guard> HarrisList<T, G> {
    /// Hand an unlinked node to the guard.
    ///
    /// # Safety
    /// The caller's unlink CAS of `node` must have succeeded.
    unsafe fn retire(&self, node: NodePtr<T>) {
        unsafe {
            self.guard.defer_destroy(node, ListNode::dealloc_ptr);
        }
    }

    // Core operation: search with cleanup.
    //
    // Returns the window around `key`, unlinking every marked node passed on
    // the way. A lost unlink CAS means pred changed (new successor or pred got
    // marked), so the walk restarts from `start`.
    //
    fn find(&self, start: NodePtr<T>, key: Key) -> Window<T> {
        loop {
            if let Some(window) = self.try_find(start, key) {
                return window;
            }

            trace!(key, "find restarted after losing an unlink race");
            contention_hint();
        }
    }

    /// One pass of `find`. `None` asks the caller to restart.
    fn try_find(&self, start: NodePtr<T>, key: Key) -> Option<Window<T>> {
        let mut pred = start;
        let mut curr = unsafe { (*pred).next.get_reference() };

        loop {
            let (mut succ, mut marked) = unsafe { (*curr).next.load() };

            while marked {
                // curr is logically deleted, snip it out using its frozen successor.
                //
                let snipped = unsafe { (*pred).next.compare_and_set(curr, succ, false, false) };

                if !snipped {
                    return None;
                }

                unsafe { self.retire(curr) };

                curr = succ;
                (succ, marked) = unsafe { (*curr).next.load() };
            }

            // TAIL holds MAX_KEY, which is above every item key, so the walk
            // always stops before running off the end.
            if unsafe { (*curr).key } >= key {
                return Some(Window { pred, curr });
            }

            pred = curr;
            curr = succ;
        }
    }
}

impl<T: SetKey + Send + 'static, G: Guard> HarrisList<T, G> {
    /// Adds `item`. Returns `false` if an item with the same key is present.
    pub fn add(&self, item: T) -> bool {
        let key = item_key(&item);
        let _guard = G::pin();

        // Not published yet, exclusively owned until the linking CAS succeeds.
        let new_node = Box::into_raw(Box::new(ListNode::new(key, item)));

        loop {
            let Window { pred, curr } = self.find(self.head, key);

            if unsafe { (*curr).key } == key {
                unsafe { ListNode::dealloc_ptr(new_node) };
                return false;
            }

            unsafe { (*new_node).next.set(curr, false) };

            // Publish: succeeds only if pred is unmarked and still points to curr.
            //
            if unsafe { (*pred).next.compare_and_set(curr, new_node, false, false) } {
                return true;
            }

            trace!(key, "add lost the publish race, retrying");
            contention_hint();
        }
    }

    /// Removes the item with the same key as `item`.
    ///
    /// Returns `true` if this call marked it.
    ///
    pub fn remove(&self, item: &T) -> bool {
        let key = item_key(item);
        let _guard = G::pin();

        loop {
            let Window { pred, curr } = self.find(self.head, key);

            if unsafe { (*curr).key } != key {
                return false;
            }

            let succ = unsafe { (*curr).next.get_reference() };

            // LINEARIZATION POINT: mark curr while its successor is still succ.
            // Expecting the unmarked state makes exactly one concurrent remover win.
            //
            let marked = unsafe { (*curr).next.compare_and_set(succ, succ, false, true) };

            if !marked {
                trace!(key, "remove lost the mark race, retrying");
                contention_hint();
                continue;
            }

            // One best-effort unlink. If it loses, a later find() finishes the job.
            //
            if unsafe { (*pred).next.compare_and_set(curr, succ, false, false) } {
                unsafe { self.retire(curr) };
            } else {
                trace!(key, "unlink left to a later search");
            }

            return true;
        }
    }

    /// Membership test. Never unlinks, never helps.
    pub fn contains(&self, item: &T) -> bool {
        let key = item_key(item);
        let _guard = G::pin();

        let curr = self.seek(key);
        let node = unsafe { &*curr };
        node.key == key && !node.next.is_marked()
    }

    /// Returns a guarded reference to the stored item with the same key.
    ///
    /// The stored item may differ from `item` when distinct items share a key.
    ///
    pub fn get(&self, item: &T) -> Option<G::GuardedRef<'_, T>> {
        let key = item_key(item);
        let _guard = G::pin();

        let curr = self.seek(key);
        let node = unsafe { &*curr };

        if node.key != key || node.next.is_marked() {
            return None;
        }

        let stored = node.item()? as *const T;
        // Safety: the node cannot be freed before the guarded reference drops
        unsafe { Some(G::make_ref(stored)) }
    }

    /// First node with `node.key >= key`, following references only.
    fn seek(&self, key: Key) -> NodePtr<T> {
        let mut curr = self.head;
        while unsafe { (*curr).key } < key {
            curr = unsafe { (*curr).next.get_reference() };
        }
        curr
    }
}

#[inline]
fn item_key<T: SetKey>(item: &T) -> Key {
    let key = item.set_key();
    debug_assert!(is_item_key(key), "item key {key} is reserved for sentinels");
    key
}

impl<T: SetKey + Send + 'static, G: Guard> Set<T> for HarrisList<T, G> {
    fn add(&self, item: T) -> bool {
        HarrisList::add(self, item)
    }

    fn remove(&self, item: &T) -> bool {
        HarrisList::remove(self, item)
    }

    fn contains(&self, item: &T) -> bool {
        HarrisList::contains(self, item)
    }
}

impl<T, G: Guard> Default for HarrisList<T, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SetKey + Send + 'static, G: Guard> FromIterator<T> for HarrisList<T, G> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let list = HarrisList::new();
        for item in iter {
            list.add(item);
        }
        list
    }
}

impl<T: SetKey + Send + 'static, G: Guard> Extend<T> for HarrisList<T, G> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: fmt::Debug, G: Guard> fmt::Debug for HarrisList<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.for_each_item(|item| {
            list.entry(item);
        });
        list.finish()
    }
}

impl<T: fmt::Display, G: Guard> fmt::Display for HarrisList<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = f.write_str("[");
        let mut first = true;
        self.for_each_item(|item| {
            if result.is_err() {
                return;
            }
            result = if first {
                write!(f, "{item}")
            } else {
                write!(f, ", {item}")
            };
            first = false;
        });
        result?;
        f.write_str("]")
    }
}

impl<T, G: Guard> Drop for HarrisList<T, G> {
    fn drop(&mut self) {
        // Free every node still linked, sentinels included. Marked nodes whose
        // unlink was deferred are still linked and are freed here; retired
        // nodes belong to the guard.
        //
        let mut freed = 0usize;
        let mut curr = self.head;

        while !curr.is_null() {
            unsafe {
                debug_assert!(
                    (*curr).is_sentinel() || is_item_key((*curr).key),
                    "item node carries a sentinel key"
                );
                let next = (*curr).next.get_reference();
                ListNode::dealloc_ptr(curr);
                curr = next;
            }
            freed += 1;
        }

        debug!(freed, "harris list dropped");
    }
}

// ============================================================================
// Tests - list internals
// ============================================================================
// Note: Common tests are in common_tests and tests/
