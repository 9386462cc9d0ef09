//! Mutable simulation state lent to each service unit for one epoch step.

use cq_core::SimRng;
use cq_queue::{DischargeList, Waitlist};

/// The shared resources a unit touches while it advances.
///
/// The simulation builds one `ServiceContext` per epoch and passes it to every
/// unit in turn.  Units run strictly one after another, so the exclusive
/// borrows here are all the mutual exclusion the waitlist needs.
pub struct ServiceContext<'a> {
    pub waitlist:   &'a mut Waitlist,
    pub discharged: &'a mut DischargeList,
    /// The run's single random stream.
    pub rng:        &'a mut SimRng,
}

impl<'a> ServiceContext<'a> {
    #[inline]
    pub fn new(
        waitlist:   &'a mut Waitlist,
        discharged: &'a mut DischargeList,
        rng:        &'a mut SimRng,
    ) -> Self {
        Self { waitlist, discharged, rng }
    }
}
