//! `ServiceUnit`: the closed set of things the epoch loop can advance.

use cq_core::Epoch;
use cq_patient::Patient;

use crate::caseload::AdvanceTally;
use crate::{Caseload, GroupServer, Server, ServiceContext};

/// What one unit did during one epoch step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochReport {
    /// Patients moved from the waitlist into the caseload.
    pub admitted:   usize,
    /// Patients advanced by one appointment.
    pub advanced:   usize,
    pub attended:   usize,
    pub extended:   usize,
    /// Patients moved from the caseload to the discharge list.
    pub discharged: usize,
}

impl EpochReport {
    pub(crate) fn new(admitted: usize, tally: AdvanceTally, discharged: usize) -> Self {
        Self {
            admitted,
            advanced: tally.advanced,
            attended: tally.attended,
            extended: tally.extended,
            discharged,
        }
    }
}

impl std::ops::AddAssign for EpochReport {
    fn add_assign(&mut self, rhs: Self) {
        self.admitted   += rhs.admitted;
        self.advanced   += rhs.advanced;
        self.attended   += rhs.attended;
        self.extended   += rhs.extended;
        self.discharged += rhs.discharged;
    }
}

/// A capacity-bound service unit of either kind.
#[derive(Debug)]
pub enum ServiceUnit {
    Individual(Server),
    Group(GroupServer),
}

impl ServiceUnit {
    /// Advance this unit by one epoch.
    pub fn process_epoch(&mut self, epoch: Epoch, ctx: &mut ServiceContext<'_>) -> EpochReport {
        match self {
            ServiceUnit::Individual(s) => s.process_epoch(epoch, ctx),
            ServiceUnit::Group(g) => g.process_epoch(epoch, ctx),
        }
    }

    pub fn caseload(&self) -> &Caseload {
        match self {
            ServiceUnit::Individual(s) => s.caseload(),
            ServiceUnit::Group(g) => g.caseload(),
        }
    }

    #[inline]
    pub fn n_patients(&self) -> usize {
        self.caseload().n_patients()
    }

    #[inline]
    pub fn max_caseload(&self) -> usize {
        self.caseload().max_caseload()
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.caseload().patients()
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self, ServiceUnit::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupServer> {
        match self {
            ServiceUnit::Group(g) => Some(g),
            ServiceUnit::Individual(_) => None,
        }
    }
}

impl From<Server> for ServiceUnit {
    fn from(s: Server) -> Self {
        ServiceUnit::Individual(s)
    }
}

impl From<GroupServer> for ServiceUnit {
    fn from(g: GroupServer) -> Self {
        ServiceUnit::Group(g)
    }
}
