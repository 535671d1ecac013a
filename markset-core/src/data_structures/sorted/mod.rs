//! Lock-free sorted collection implementations.
//!
//! Collections are parameterized by a guard type `G: Guard` that determines
//! the memory reclamation strategy:
//!
//! - `DeferredGuard`: Testing - defers destruction until the list drops
//! - `EpochGuard`: Production - epoch-based reclamation (crossbeam-epoch)

pub mod harris_list;

pub use harris_list::{HarrisList, ListNode};
