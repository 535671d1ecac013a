//! markset-demo: concurrent add/remove workload against a Harris list.
//!
//! # Usage
//!
//! ```bash
//! markset-demo --seed 1,3,5,7,9 --adds 2,10,8,4,6 --removes 1,9,7,3,5 --rounds 100
//! RUST_LOG=debug markset-demo --guard deferred
//! ```

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use markset_demo::{GuardKind, WorkloadConfig, run};

/// Seed a lock-free list, run one adding and one removing worker, print the result.
#[derive(Parser, Debug)]
#[command(name = "markset-demo")]
#[command(about = "Two-worker demo driver for the markset lock-free list")]
struct Cli {
    /// Keys added sequentially before the workers start.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    seed: Option<Vec<i32>>,

    /// Keys the adding worker inserts, in order.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    adds: Option<Vec<i32>>,

    /// Keys the removing worker deletes, in order.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    removes: Option<Vec<i32>>,

    /// Memory reclamation scheme.
    #[arg(long, value_enum, default_value_t = GuardKind::Epoch)]
    guard: GuardKind,

    /// Repeat the scenario on fresh lists this many times.
    #[arg(long, default_value_t = 1)]
    rounds: usize,
}

impl Cli {
    fn workload(self) -> WorkloadConfig {
        let defaults = WorkloadConfig::default();
        let default_script = |worker: usize| -> Vec<i32> {
            defaults.workers[worker].iter().map(|op| op.key()).collect()
        };

        let adds = self.adds.unwrap_or_else(|| default_script(0));
        let removes = self.removes.unwrap_or_else(|| default_script(1));
        let seed = self.seed.unwrap_or_else(|| defaults.seed.clone());

        WorkloadConfig::from_scripts(seed, &adds, &removes).with_rounds(self.rounds)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let guard = cli.guard;
    let config = cli.workload();
    info!(?config, ?guard, "starting workload");

    let reports = run(&config, guard).context("workload failed")?;

    if let Some(last) = reports.last() {
        println!("{}", last);
    }
    if reports.iter().all(|report| report.verified) {
        info!(rounds = reports.len(), "all rounds verified");
    } else {
        info!(
            rounds = reports.len(),
            "all rounds finished, membership not verified"
        );
    }

    Ok(())
}
