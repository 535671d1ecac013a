//! The `Set` capability interface.
//!
//! Membership is decided by [`SetKey`]: an item is present when an item with
//! the same key is present. All methods take `&self` so a single instance can
//! be shared between threads behind an `Arc`.

use crate::data_structures::SetKey;

// ============================================================================
// Set - membership operations shared by every set implementation
// ============================================================================

/// A concurrent set of items ordered by their [`SetKey`].
///
/// Boolean results are ordinary outcomes, not errors: `false` from `add`
/// means "already present", `false` from `remove` means "not found".
///
pub trait Set<T: SetKey> {
    /// Adds `item`.
    ///
    /// Returns `true` if it was absent and is now present, `false` if an item
    /// with the same key is already present (the set is left unchanged and
    /// `item` is dropped).
    ///
    fn add(&self, item: T) -> bool;

    /// Removes the item with the same key as `item`.
    ///
    /// Returns `true` if this call removed it, `false` if it was not present.
    ///
    fn remove(&self, item: &T) -> bool;

    /// Returns `true` if an item with the same key is present.
    fn contains(&self, item: &T) -> bool;
}
