use thiserror::Error;

/// Failures of a demo workload: bad configuration, a crashed worker, or a
/// final membership that differs from the one the scripts imply.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("worker {worker} has an empty script")]
    EmptyScript { worker: usize },

    #[error("worker {worker} touches key {key} more than once")]
    DuplicateKey { worker: usize, key: i32 },

    #[error("{count} workers requested, at most {max} supported")]
    TooManyWorkers { count: usize, max: usize },

    #[error("at least one round is required")]
    NoRounds,

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("round {round}: expected {expected:?}, found {actual:?}")]
    Mismatch {
        round: usize,
        expected: Vec<i32>,
        actual: Vec<i32>,
    },
}
