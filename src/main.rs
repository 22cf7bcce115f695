//! # evensum command line
//!
//! Sums the positive even integers of `resource<k>.txt` files, one worker per
//! file, printing the running total as each result is folded.
//!
//! When the directory holds fewer than `--count` resources, `--count`
//! synthetic resources of `--size` random integers are generated first.
//!
//! ```bash
//! evensum --dir ./resources --count 7 --deadline-secs 60
//! RUST_LOG=evensum=debug evensum --dir ./resources
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evensum::resources::store;
use evensum::{Config, FileReducer, LogWriter, ReducerRef, RunController};

#[derive(Parser, Debug)]
#[command(name = "evensum", version, about = "Concurrent sum of positive even integers")]
struct Args {
    /// Directory holding resource<k>.txt files.
    #[arg(long, default_value = "resources")]
    dir: PathBuf,

    /// Minimum number of resources; missing ones are generated.
    #[arg(long, default_value_t = 7)]
    count: usize,

    /// Integers per generated resource.
    #[arg(long, default_value_t = 7)]
    size: usize,

    /// Upper bound of each worker's random startup delay, in milliseconds.
    #[arg(long, default_value_t = 4_000)]
    max_delay_ms: u64,

    /// Global completion deadline, in seconds.
    #[arg(long, default_value_t = 60)]
    deadline_secs: u64,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "evensum=info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let resources = store::discover_or_generate(&args.dir, args.count, args.size)
        .await
        .with_context(|| format!("preparing resources in {}", args.dir.display()))?;
    tracing::info!(count = resources.len(), dir = %args.dir.display(), "resources ready");

    let cfg = Config::default()
        .with_max_delay(Duration::from_millis(args.max_delay_ms))
        .with_deadline(Duration::from_secs(args.deadline_secs));
    let ctl = RunController::builder(cfg)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    let reducer: ReducerRef = Arc::new(FileReducer::new(args.dir.clone()));
    let mut run = ctl.start(resources, reducer)?;

    if let Some(mut live) = run.take_live() {
        while let Some(total) = live.next().await {
            println!("{total}");
        }
    }

    let outcome = run.wait().await?;
    println!("TOTAL: {}", outcome.total());
    for failure in outcome.failures() {
        eprintln!("failed: {failure}");
    }

    ctl.shutdown().await;
    Ok(())
}
