//! Ordering keys for set items.
//!
//! A `HarrisList` orders its nodes by an integer [`Key`] derived once from
//! each item. Two items that derive the same key are the same set element:
//! the second `add` is rejected and `remove`/`contains` cannot tell them apart.
//!
//! `MIN_KEY` and `MAX_KEY` belong to the head and tail sentinels. No `SetKey`
//! implementation in this crate produces them, and custom implementations
//! must not either.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Ordering key of a list node.
pub type Key = i64;

/// Key of the head sentinel.
pub const MIN_KEY: Key = i64::MIN;

/// Key of the tail sentinel.
pub const MAX_KEY: Key = i64::MAX;

/// Deterministic key derivation for set items.
pub trait SetKey {
    /// Derive the ordering key. Must return the same value for equal items
    /// and must never return `MIN_KEY` or `MAX_KEY`.
    fn set_key(&self) -> Key;
}

/// Returns true if `key` can belong to a real item.
#[inline]
pub fn is_item_key(key: Key) -> bool {
    key != MIN_KEY && key != MAX_KEY
}

macro_rules! impl_set_key_widening {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SetKey for $ty {
                #[inline]
                fn set_key(&self) -> Key {
                    Key::from(*self)
                }
            }
        )*
    };
}

// Every value of these types fits strictly inside (MIN_KEY, MAX_KEY).
impl_set_key_widening!(i8, i16, i32, u8, u16, u32);

impl<T: SetKey + ?Sized> SetKey for &T {
    #[inline]
    fn set_key(&self) -> Key {
        (**self).set_key()
    }
}

/// Wraps any `Hash` value so it can be stored in a set.
///
/// The key is a 64-bit hash computed with a fixed-key hasher, so it is stable
/// across threads and across list instances within one build. Hash results
/// that land on a sentinel key are nudged one step inward.
///
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hashed<T>(pub T);

impl<T> Hashed<T> {
    pub fn new(value: T) -> Self {
        Hashed(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Hash> SetKey for Hashed<T> {
    fn set_key(&self) -> Key {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        clamp_to_item_range(hasher.finish() as Key)
    }
}

impl<T> Deref for Hashed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Hashed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hashed({:?})", self.0)
    }
}

impl<T: fmt::Display> fmt::Display for Hashed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[inline]
fn clamp_to_item_range(raw: Key) -> Key {
    raw.clamp(MIN_KEY + 1, MAX_KEY - 1)
}
