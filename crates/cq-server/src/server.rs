//! `Server`: individual service with continuous refill.

use cq_core::Epoch;
use cq_patient::Patient;
use cq_queue::Intake;

use crate::{Caseload, EpochReport, ServiceContext};

/// Serves up to `max_caseload` patients concurrently, each on its own
/// schedule.  A discharged patient's slot is refilled on the next epoch.
///
/// A `max_caseload` of zero is a valid, permanently idle server.
#[derive(Debug)]
pub struct Server {
    intake:   Intake,
    caseload: Caseload,
}

impl Server {
    pub fn new(max_caseload: usize, intake: Intake) -> Self {
        Self {
            intake,
            caseload: Caseload::new(max_caseload),
        }
    }

    /// One epoch step:
    ///
    /// 1. top the caseload up from the waitlist;
    /// 2. advance every occupant, including those admitted in step 1;
    /// 3. discharge every occupant whose course is now complete.
    pub fn process_epoch(&mut self, epoch: Epoch, ctx: &mut ServiceContext<'_>) -> EpochReport {
        let admitted = self.caseload.fill_from(ctx.waitlist, self.intake, epoch);
        let tally = self.caseload.advance_all(epoch, ctx.rng);
        let discharged = self.caseload.discharge_completed(epoch, ctx.discharged);
        EpochReport::new(admitted, tally, discharged)
    }

    #[inline]
    pub fn intake(&self) -> Intake {
        self.intake
    }

    #[inline]
    pub fn n_patients(&self) -> usize {
        self.caseload.n_patients()
    }

    #[inline]
    pub fn max_caseload(&self) -> usize {
        self.caseload.max_caseload()
    }

    pub fn caseload(&self) -> &Caseload {
        &self.caseload
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.caseload.patients()
    }
}
