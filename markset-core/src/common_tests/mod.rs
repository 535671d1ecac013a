//! Generic test suites shared by every `Set` implementation and guard flavour.
//!
//! Integration tests in this crate run them against `DeferredGuard`,
//! markset-crossbeam runs them against `EpochGuard`.

pub mod set_core_tests;
