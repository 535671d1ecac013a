//! Runs a workload against a fresh list per round.
//!
//! Every worker gets its own `Arc` handle to the shared list. The driver seeds
//! the list sequentially, starts all workers, joins them, and compares the
//! final snapshot with the membership implied by the scripts.

use std::fmt;
use std::sync::Arc;
use std::thread;

use markset_core::guard::Guard;
use markset_core::{DeferredGuard, HarrisList};
use markset_crossbeam::EpochGuard;
use tracing::{debug, info, warn};

use crate::config::{GuardKind, Op, WorkloadConfig};
use crate::error::WorkloadError;

/// Per-worker outcome: one boolean per scripted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub results: Vec<(Op, bool)>,
}

impl WorkerReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, ok)| *ok).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub round: usize,
    /// Whether the snapshot was checked against the expected membership.
    pub verified: bool,
    pub seed_results: Vec<bool>,
    pub workers: Vec<WorkerReport>,
    pub snapshot: Vec<i32>,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {}: [", self.round)?;
        for (i, key) in self.snapshot.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", key)?;
        }
        write!(f, "]")
    }
}

/// Run every round of `config` on lists backed by `guard`.
pub fn run(config: &WorkloadConfig, guard: GuardKind) -> Result<Vec<RoundReport>, WorkloadError> {
    config.validate()?;

    let expected = config.expected_membership();
    if expected.is_none() {
        warn!("workers share keys, final membership will not be verified");
    }

    let mut reports = Vec::with_capacity(config.rounds);
    for round in 0..config.rounds {
        let mut report = match guard {
            GuardKind::Epoch => run_round::<EpochGuard>(round, config)?,
            GuardKind::Deferred => run_round::<DeferredGuard>(round, config)?,
        };

        if let Some(expected) = &expected {
            let expected: Vec<i32> = expected.iter().copied().collect();
            if report.snapshot != expected {
                return Err(WorkloadError::Mismatch {
                    round,
                    expected,
                    actual: report.snapshot,
                });
            }
            report.verified = true;
        }

        reports.push(report);
    }

    Ok(reports)
}

/// Seed a fresh list, run all workers concurrently, and snapshot the result.
pub fn run_round<G>(round: usize, config: &WorkloadConfig) -> Result<RoundReport, WorkloadError>
where
    G: Guard + 'static,
{
    let list: Arc<HarrisList<i32, G>> = Arc::new(HarrisList::new());

    let seed_results: Vec<bool> = config.seed.iter().map(|&key| list.add(key)).collect();
    debug!(round, seed = ?config.seed, ?seed_results, "list seeded");

    let mut handles = Vec::with_capacity(config.workers.len());
    for (worker, script) in config.workers.iter().enumerate() {
        let list = Arc::clone(&list);
        let script = script.clone();
        let handle = thread::Builder::new()
            .name(format!("worker-{}", worker))
            .spawn(move || run_script(&list, &script))
            .map_err(|source| WorkloadError::Spawn { worker, source })?;
        handles.push(handle);
    }

    let mut workers = Vec::with_capacity(handles.len());
    for (worker, handle) in handles.into_iter().enumerate() {
        let results = handle
            .join()
            .map_err(|_| WorkloadError::WorkerPanicked { worker })?;
        let report = WorkerReport { worker, results };
        debug!(
            round,
            worker,
            calls = report.results.len(),
            succeeded = report.succeeded(),
            "worker finished"
        );
        workers.push(report);
    }

    let snapshot = list.snapshot();
    info!(round, list = %list, "round finished");

    Ok(RoundReport {
        round,
        verified: false,
        seed_results,
        workers,
        snapshot,
    })
}

fn run_script<G: Guard>(list: &HarrisList<i32, G>, script: &[Op]) -> Vec<(Op, bool)> {
    script
        .iter()
        .map(|&op| {
            let ok = match op {
                Op::Add(key) => list.add(key),
                Op::Remove(key) => list.remove(&key),
            };
            (op, ok)
        })
        .collect()
}
