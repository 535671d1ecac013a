//! Workload description for the demo driver.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::WorkloadError;

/// Upper bound on concurrently spawned workers.
pub const MAX_WORKERS: usize = 64;

/// A single call a worker issues against the shared set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add(i32),
    Remove(i32),
}

impl Op {
    pub fn key(&self) -> i32 {
        match *self {
            Op::Add(key) | Op::Remove(key) => key,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Add(key) => write!(f, "add({})", key),
            Op::Remove(key) => write!(f, "remove({})", key),
        }
    }
}

/// Which reclamation scheme backs the list under test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GuardKind {
    /// crossbeam-epoch reclamation
    #[default]
    Epoch,
    /// Retired nodes are kept until the list is dropped
    Deferred,
}

/// Seed contents, one script per worker, and how many times to repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub seed: Vec<i32>,
    pub workers: Vec<Vec<Op>>,
    pub rounds: usize,
}

impl Default for WorkloadConfig {
    /// Seed `{1,3,5,7,9}`, one worker adding the evens, one removing the odds.
    fn default() -> Self {
        Self::from_scripts(vec![1, 3, 5, 7, 9], &[2, 10, 8, 4, 6], &[1, 9, 7, 3, 5])
    }
}

impl WorkloadConfig {
    /// Two workers: one issuing `adds`, the other `removes`.
    pub fn from_scripts(seed: Vec<i32>, adds: &[i32], removes: &[i32]) -> Self {
        WorkloadConfig {
            seed,
            workers: vec![
                adds.iter().copied().map(Op::Add).collect(),
                removes.iter().copied().map(Op::Remove).collect(),
            ],
            rounds: 1,
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn validate(&self) -> Result<(), WorkloadError> {
        if self.rounds == 0 {
            return Err(WorkloadError::NoRounds);
        }
        if self.workers.len() > MAX_WORKERS {
            return Err(WorkloadError::TooManyWorkers {
                count: self.workers.len(),
                max: MAX_WORKERS,
            });
        }

        for (worker, script) in self.workers.iter().enumerate() {
            if script.is_empty() {
                return Err(WorkloadError::EmptyScript { worker });
            }
            let mut seen = HashSet::new();
            for op in script {
                if !seen.insert(op.key()) {
                    return Err(WorkloadError::DuplicateKey {
                        worker,
                        key: op.key(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The membership every interleaving must end in, or `None` when two
    /// workers share a key and the outcome depends on scheduling.
    pub fn expected_membership(&self) -> Option<BTreeSet<i32>> {
        let mut owner = HashMap::new();
        for (worker, script) in self.workers.iter().enumerate() {
            for op in script {
                if *owner.entry(op.key()).or_insert(worker) != worker {
                    return None;
                }
            }
        }

        // Disjoint scripts commute, so any serial order gives the answer.
        let mut expected: BTreeSet<i32> = self.seed.iter().copied().collect();
        for op in self.workers.iter().flatten() {
            match *op {
                Op::Add(key) => expected.insert(key),
                Op::Remove(key) => expected.remove(&key),
            };
        }
        Some(expected)
    }
}
