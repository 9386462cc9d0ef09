//! The `Simulation` struct and its epoch loop.

use std::time::Instant;

use cq_core::{Epoch, SimConfig, SimRng};
use cq_queue::{DischargeList, Waitlist};
use cq_server::{EpochReport, GroupServer, Server, ServiceContext, ServiceUnit};
use tracing::{debug, info};

use crate::{ArrivalGenerator, SimObserver};

/// Everything that happened in one epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochSummary {
    pub epoch:        Epoch,
    /// New patients added to the waitlist.
    pub arrivals:     usize,
    /// Waiting patients discharged for exceeding the assessment age.
    pub aged_out:     usize,
    /// Admissions, advances, and discharges summed over every unit.
    pub service:      EpochReport,
    /// Waitlist length after every unit has drawn from it.
    pub waitlist_len: usize,
    /// Patients in any caseload at the end of the epoch.
    pub occupancy:    usize,
}

/// Top-level counters, for post-run reporting and validation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub epochs:       u64,
    pub n_admitted:   usize,
    pub n_discharged: usize,
    pub n_waitlist:   usize,
    pub n_in_service: usize,
}

/// The main simulation runner.
///
/// Holds all run state and drives the epoch loop described in the crate
/// docs.  Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    /// Validated configuration.
    pub config: SimConfig,

    /// The next epoch to run.
    pub epoch: Epoch,

    /// Patients awaiting admission.
    pub waitlist: Waitlist,

    /// Every patient discharged so far, from any source.
    pub discharged: DischargeList,

    /// Service units in advance order: individual servers, then group servers.
    pub units: Vec<ServiceUnit>,

    pub arrivals: ArrivalGenerator,

    /// The run's single random stream.
    pub rng: SimRng,

    /// Patients added to the waitlist so far, including prefill.
    pub(crate) n_admitted: usize,
}

impl Simulation {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current epoch to `config.n_epochs`.
    ///
    /// Calls observer hooks at every epoch boundary, then
    /// [`on_sim_end`][SimObserver::on_sim_end] once.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> RunSummary {
        let start = Instant::now();
        while self.epoch.0 < self.config.n_epochs {
            self.step(observer);
        }
        observer.on_sim_end(self.epoch, &self.discharged);

        let summary = self.summary();
        info!(
            epochs     = summary.epochs,
            admitted   = summary.n_admitted,
            discharged = summary.n_discharged,
            waitlist   = summary.n_waitlist,
            in_service = summary.n_in_service,
            elapsed_s  = start.elapsed().as_secs_f64(),
            "simulation complete"
        );
        summary
    }

    /// Run exactly `n` epochs from the current position (ignores
    /// `config.n_epochs`, does not call `on_sim_end`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_epochs<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Place `n` patients on the waitlist at epoch 0.  They draw class, age,
    /// and modality exactly like regular arrivals.
    pub fn prefill_waitlist(&mut self, n: usize) {
        for _ in 0..n {
            let patient = self.arrivals.generate(Epoch::ZERO, &mut self.rng);
            self.waitlist.add_patient(patient, Epoch::ZERO);
        }
        self.n_admitted += n;
    }

    /// Draw this epoch's arrivals and append them to the waitlist.  Returns
    /// the number of arrivals.
    pub fn generate_arrivals(&mut self, epoch: Epoch) -> usize {
        let n = self.arrivals.draw_count(&mut self.rng);
        for _ in 0..n {
            let patient = self.arrivals.generate(epoch, &mut self.rng);
            self.waitlist.add_patient(patient, epoch);
        }
        self.n_admitted += n;
        n
    }

    // ── Counters ──────────────────────────────────────────────────────────

    /// Patients ever added to the waitlist.
    pub fn n_admitted(&self) -> usize {
        self.n_admitted
    }

    pub fn n_discharged(&self) -> usize {
        self.discharged.n_patients()
    }

    pub fn n_waitlist(&self) -> usize {
        self.waitlist.len_waitlist()
    }

    /// Patients currently in any caseload.
    pub fn n_in_service(&self) -> usize {
        self.units.iter().map(ServiceUnit::n_patients).sum()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            epochs:       self.epoch.0,
            n_admitted:   self.n_admitted(),
            n_discharged: self.n_discharged(),
            n_waitlist:   self.n_waitlist(),
            n_in_service: self.n_in_service(),
        }
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.units.iter().filter_map(|u| match u {
            ServiceUnit::Individual(s) => Some(s),
            ServiceUnit::Group(_) => None,
        })
    }

    pub fn group_servers(&self) -> impl Iterator<Item = &GroupServer> {
        self.units.iter().filter_map(ServiceUnit::as_group)
    }

    // ── Core epoch processing ─────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.epoch;
        observer.on_epoch_start(now);
        let summary = self.process_epoch(now);
        observer.on_epoch_end(&summary);
        self.epoch = now.next();
    }

    fn process_epoch(&mut self, now: Epoch) -> EpochSummary {
        let arrivals = self.generate_arrivals(now);
        let aged_out = self.waitlist.purge_aged_out(now, &mut self.discharged);

        // Units take turns with the waitlist in construction order; each
        // unit's step runs to completion before the next begins.
        let mut service = EpochReport::default();
        let mut ctx = ServiceContext::new(&mut self.waitlist, &mut self.discharged, &mut self.rng);
        for unit in &mut self.units {
            service += unit.process_epoch(now, &mut ctx);
        }

        let summary = EpochSummary {
            epoch: now,
            arrivals,
            aged_out,
            service,
            waitlist_len: self.waitlist.len_waitlist(),
            occupancy: self.n_in_service(),
        };
        debug!(
            epoch      = now.0,
            arrivals,
            aged_out,
            admitted   = service.admitted,
            discharged = service.discharged,
            waitlist   = summary.waitlist_len,
            occupancy  = summary.occupancy,
            "epoch done"
        );
        summary
    }
}
