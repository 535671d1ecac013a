//! Demo driver for the markset lock-free list.
//!
//! Seeds a list, runs a fixed add/remove script per worker thread, joins, and
//! checks the final snapshot.

pub mod config;
pub mod error;
pub mod workload;

pub use config::{GuardKind, MAX_WORKERS, Op, WorkloadConfig};
pub use error::WorkloadError;
pub use workload::{RoundReport, WorkerReport, run, run_round};
