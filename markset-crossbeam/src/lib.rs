//! Crossbeam-based reclamation for markset collections.
//!
//! This crate provides `EpochGuard`, an implementation of the `Guard` trait
//! using crossbeam-epoch for memory reclamation.
//!
//! # Usage
//!
//! ```ignore
//! use markset_core::HarrisList;
//! use markset_crossbeam::EpochGuard;
//!
//! let set: HarrisList<i32, EpochGuard> = HarrisList::new();
//! set.add(42);
//! ```

pub mod epoch_guard;

pub use epoch_guard::{EpochGuard, EpochRef};

/// A `HarrisList` using epoch-based reclamation.
pub type EpochHarrisList<T> = markset_core::HarrisList<T, EpochGuard>;
