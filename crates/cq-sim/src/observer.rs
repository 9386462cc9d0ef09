//! Simulation observer trait for progress reporting and data collection.

use cq_core::Epoch;
use cq_queue::DischargeList;

use crate::EpochSummary;

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the epoch loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: waitlist printer
///
/// ```rust,ignore
/// struct WaitlistPrinter { interval: u64 }
///
/// impl SimObserver for WaitlistPrinter {
///     fn on_epoch_end(&mut self, s: &EpochSummary) {
///         if s.epoch.0 % self.interval == 0 {
///             println!("{}: {} waiting", s.epoch, s.waitlist_len);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each epoch, before arrivals.
    fn on_epoch_start(&mut self, _epoch: Epoch) {}

    /// Called once every unit has advanced for the epoch.
    fn on_epoch_end(&mut self, _summary: &EpochSummary) {}

    /// Called once after the final epoch, with every patient discharged over
    /// the whole run.
    fn on_sim_end(&mut self, _final_epoch: Epoch, _discharged: &DischargeList) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
