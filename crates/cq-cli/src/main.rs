//! `caseflow`: run a batch of independent simulations and write per-run
//! output files.
//!
//! ```text
//! caseflow --runs 8 --n-epochs 2000 --utilization 0.9 --format parquet
//! RUST_LOG=cq_sim=debug caseflow --config scenario.json
//! ```

mod args;


use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use cq_core::SimConfig;
use cq_output::{
    CsvWriter, OutputResult, OutputWriter, ParquetWriter, SimOutputObserver, SqliteWriter,
};
use cq_sim::run_replications;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Format};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.to_config()?;

    fs::create_dir_all(&args.folder)
        .with_context(|| format!("creating output folder {}", args.folder.display()))?;

    info!(
        runs      = args.runs,
        epochs    = config.n_epochs,
        servers   = config.n_servers,
        arr_lam   = config.arr_lam,
        seed      = config.seed,
        format    = ?args.format,
        folder    = %args.folder.display(),
        "starting batch"
    );

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build().context("building worker pool")?;

    let start = Instant::now();
    pool.install(|| match args.format {
        Format::Csv => run_batch(&config, &args, CsvWriter::new),
        Format::Parquet => run_batch(&config, &args, ParquetWriter::new),
        Format::Sqlite => run_batch(&config, &args, SqliteWriter::new),
    })?;

    info!(elapsed_s = start.elapsed().as_secs_f64(), "batch complete");
    Ok(())
}

/// Run every replication with writers opened by `open`, then surface the
/// first output error of any run.
fn run_batch<W, F>(config: &SimConfig, args: &Args, open: F) -> anyhow::Result<()>
where
    W: OutputWriter + Send,
    F: Fn(&Path, u32, bool) -> OutputResult<W> + Sync,
{
    let stream = config.waitlist_logging;
    let results = run_replications(config, args.runs, |run| {
        let writer = open(&args.folder, run, stream)
            .with_context(|| format!("opening output files for run {run}"))?;
        anyhow::Ok(SimOutputObserver::new(writer, stream))
    })?;

    for (run, (summary, mut observer)) in results.into_iter().enumerate() {
        if let Some(e) = observer.take_error() {
            return Err(e).with_context(|| format!("writing output for run {run}"));
        }
        info!(
            run,
            n_admitted   = summary.n_admitted,
            n_discharged = summary.n_discharged,
            n_waitlist   = summary.n_waitlist,
            "run summary"
        );
    }
    Ok(())
}
