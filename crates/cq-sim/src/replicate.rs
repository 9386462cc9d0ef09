//! Independent replications of one configuration.
//!
//! Every run gets its own [`Simulation`], its own observer, and a seed
//! derived with [`SimConfig::seed_for_run`], so runs share no mutable state
//! and may execute concurrently.  With the `parallel` feature they run on Rayon's
//! thread pool; results always come back in run order.
//!
//! A run's observer and simulation exist only from the moment that run starts,
//! so a batch holds at most one run's resources per worker thread.

use cq_core::SimConfig;
use tracing::info;

use crate::{ArrivalGenerator, RunSummary, SimBuilder, SimError, SimObserver};

/// Run `runs` replications of `base`.
///
/// The config is checked once before any run starts, so a bad config aborts
/// the batch before any epoch executes.  `make_observer(run)` is then called
/// as each run begins; an error from it stops the batch (runs already
/// executing on other workers finish first).
pub fn run_replications<O, E, F>(
    base:          &SimConfig,
    runs:          u32,
    make_observer: F,
) -> Result<Vec<(RunSummary, O)>, E>
where
    O: SimObserver + Send,
    E: From<SimError> + Send,
    F: Fn(u32) -> Result<O, E> + Sync,
{
    base.validate().map_err(|e| E::from(SimError::from(e)))?;
    ArrivalGenerator::from_config(base).map_err(E::from)?;
    info!(runs, "starting replications");

    #[cfg(not(feature = "parallel"))]
    {
        (0..runs).map(|run| execute(base, run, &make_observer)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        (0..runs).into_par_iter().map(|run| execute(base, run, &make_observer)).collect()
    }
}

fn execute<O, E, F>(base: &SimConfig, run: u32, make_observer: &F) -> Result<(RunSummary, O), E>
where
    O: SimObserver,
    E: From<SimError>,
    F: Fn(u32) -> Result<O, E>,
{
    let mut observer = make_observer(run)?;
    let mut sim = SimBuilder::new(base.clone())
        .seed(base.seed_for_run(run))
        .build()
        .map_err(E::from)?;

    let summary = sim.run(&mut observer);
    info!(
        run,
        admitted   = summary.n_admitted,
        discharged = summary.n_discharged,
        waitlist   = summary.n_waitlist,
        "run finished"
    );
    Ok((summary, observer))
}
