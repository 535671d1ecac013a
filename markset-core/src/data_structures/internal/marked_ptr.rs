// Marked pointer operations using the least significant bit as the deletion mark.
//
// Bit layout:
//   Bit 0: DELETE_MARK - the node that owns this next field is logically removed
//
// Mark combinations:
//   0b0 (0): Normal, unmarked node
//   0b1 (1): DELETE-marked - node is logically removed, its next pointer is frozen
//
// The successor reference and the mark share one machine word, so a single CAS
// observes and replaces both. Inserting after node X and marking node X are both
// CAS operations on X.next; once X is marked every insert CAS expecting an
// unmarked X.next fails.
//
#[cfg(loom)]
use loom::sync::atomic::{AtomicPtr, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicPtr, Ordering};

use std::fmt;

const DELETE_MARK: usize = 0b1;

/// A pointer that uses the least significant bit as the deletion mark.
pub(crate) struct MarkedPtr<T> {
    ptr: *mut T,
}

// Manual impls to avoid requiring T: Clone/Copy/PartialEq
impl<T> Copy for MarkedPtr<T> {}

impl<T> Clone for MarkedPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for MarkedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for MarkedPtr<T> {}

impl<T> fmt::Debug for MarkedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MarkedPtr({:p}, marked={})",
            self.as_ptr(),
            self.is_marked()
        )
    }
}

impl<T> MarkedPtr<T> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a new MarkedPtr from a (possibly marked) raw pointer.
    #[inline]
    pub(crate) fn new(ptr: *mut T) -> Self {
        MarkedPtr { ptr }
    }

    /// Combine a clean pointer and a mark into one word.
    #[inline]
    pub(crate) fn compose(ptr: *mut T, mark: bool) -> Self {
        debug_assert_eq!(
            ptr as usize & DELETE_MARK,
            0,
            "node pointers must leave bit 0 free for the mark"
        );
        MarkedPtr::new(ptr).with_mark(mark)
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    /// Get the clean pointer without the mark bit (the one you dereference).
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        (self.ptr as usize & !DELETE_MARK) as *mut T
    }

    /// Get the raw pointer with the mark bit intact (for CAS operations).
    #[inline]
    pub(crate) fn as_raw(&self) -> *mut T {
        self.ptr
    }

    /// Split into `(clean pointer, mark)`.
    #[inline]
    pub(crate) fn decompose(&self) -> (*mut T, bool) {
        (self.as_ptr(), self.is_marked())
    }

    // =========================================================================
    // Predicates / transformers
    // =========================================================================

    #[inline]
    pub(crate) fn is_marked(&self) -> bool {
        (self.ptr as usize & DELETE_MARK) != 0
    }

    /// Same reference, requested mark.
    #[inline]
    pub(crate) fn with_mark(&self, mark: bool) -> Self {
        let ptr_bits = self.as_ptr() as usize;
        let marked_bits = if mark {
            ptr_bits | DELETE_MARK
        } else {
            ptr_bits
        };
        MarkedPtr {
            ptr: marked_bits as *mut T,
        }
    }
}

/// Yield point for CAS retry loops.
///
/// Under loom every retry must be a scheduling point or the model checker
/// explores the spin forever. In normal builds this compiles to nothing.
#[inline]
pub(crate) fn contention_hint() {
    #[cfg(loom)]
    loom::thread::yield_now();
}

/// An atomic `(reference, mark)` pair stored in a single word.
///
/// This is the only mutable state of a list node. The reference changes
/// exclusively through [`compare_and_set`](Self::compare_and_set), the mark
/// through [`attempt_mark`](Self::attempt_mark) or a `compare_and_set` that
/// keeps the reference.
///
pub struct AtomicMarkableRef<T> {
    raw: AtomicPtr<T>,
}

impl<T> AtomicMarkableRef<T> {
    pub fn new(ptr: *mut T, mark: bool) -> Self {
        AtomicMarkableRef {
            raw: AtomicPtr::new(MarkedPtr::compose(ptr, mark).as_raw()),
        }
    }

    /// Snapshot both the reference and the mark in one atomic read.
    #[inline]
    pub fn load(&self) -> (*mut T, bool) {
        self.load_marked().decompose()
    }

    #[inline]
    pub fn get_reference(&self) -> *mut T {
        self.load_marked().as_ptr()
    }

    #[inline]
    pub fn is_marked(&self) -> bool {
        self.load_marked().is_marked()
    }

    /// Atomically replace `(expected_ref, expected_mark)` with `(new_ref, new_mark)`.
    ///
    /// Fails if either half differs from the expectation.
    ///
    #[inline]
    pub fn compare_and_set(
        &self,
        expected_ref: *mut T,
        new_ref: *mut T,
        expected_mark: bool,
        new_mark: bool,
    ) -> bool {
        let current = MarkedPtr::compose(expected_ref, expected_mark);
        let new = MarkedPtr::compose(new_ref, new_mark);
        self.raw
            .compare_exchange(
                current.as_raw(),
                new.as_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Set the mark to `new_mark` if the reference still equals `expected_ref`.
    ///
    /// The current mark is not part of the expectation: if the reference matches
    /// and the mark already has the requested value this returns `true` without
    /// writing. Returns `false` only when the reference moved.
    ///
    pub fn attempt_mark(&self, expected_ref: *mut T, new_mark: bool) -> bool {
        loop {
            let current = self.load_marked();

            if current.as_ptr() != expected_ref {
                return false;
            }

            if current.is_marked() == new_mark {
                return true;
            }

            let result = self.raw.compare_exchange(
                current.as_raw(),
                current.with_mark(new_mark).as_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            );

            if result.is_ok() {
                return true;
            }

            // Either the mark or the reference changed under us; re-evaluate.
            contention_hint();
        }
    }

    /// Unconditionally overwrite the pair.
    ///
    /// Only valid while the owning node is unpublished (exclusively owned).
    ///
    #[inline]
    pub(crate) fn set(&self, ptr: *mut T, mark: bool) {
        self.raw
            .store(MarkedPtr::compose(ptr, mark).as_raw(), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn load_marked(&self) -> MarkedPtr<T> {
        MarkedPtr::new(self.raw.load(Ordering::Acquire))
    }
}

impl<T> fmt::Debug for AtomicMarkableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ptr, mark) = self.load();
        f.debug_struct("AtomicMarkableRef")
            .field("ptr", &ptr)
            .field("marked", &mark)
            .finish()
    }
}
