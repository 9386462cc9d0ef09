//! `Caseload`: the bounded set of patients one unit is serving.
//!
//! Insertion order is admission order.  Advancing rotates the queue exactly
//! once, so every member is processed once per epoch and ends up back in its
//! original position.

use std::collections::VecDeque;

use cq_core::{Epoch, PatientId, SimRng};
use cq_patient::Patient;
use cq_queue::{DischargeList, Intake, Waitlist};
use tracing::trace;

/// Counts from one advance pass over a caseload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvanceTally {
    pub advanced: usize,
    pub attended: usize,
    pub extended: usize,
}

#[derive(Debug)]
pub struct Caseload {
    patients:     VecDeque<Patient>,
    max_caseload: usize,
}

impl Caseload {
    pub fn new(max_caseload: usize) -> Self {
        Self {
            patients: VecDeque::with_capacity(max_caseload),
            max_caseload,
        }
    }

    /// Current occupancy.
    #[inline]
    pub fn n_patients(&self) -> usize {
        self.patients.len()
    }

    #[inline]
    pub fn max_caseload(&self) -> usize {
        self.max_caseload
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.patients.len() >= self.max_caseload
    }

    /// Members in admission order.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }

    pub fn ids(&self) -> Vec<PatientId> {
        self.patients.iter().map(Patient::id).collect()
    }

    /// Admit eligible patients from `waitlist` until full or none remain.
    /// Returns the number admitted.
    pub fn fill_from(&mut self, waitlist: &mut Waitlist, intake: Intake, epoch: Epoch) -> usize {
        let mut admitted = 0;
        while !self.is_full() {
            let Some(patient) = waitlist.pop_eligible(intake, epoch) else {
                break;
            };
            trace!(patient = %patient.id(), %epoch, "admitted to caseload");
            self.patients.push_back(patient);
            admitted += 1;
        }
        admitted
    }

    /// Advance every current member by one appointment.
    ///
    /// The member count is fixed before the pass starts, so each patient is
    /// processed exactly once even though it is re-enqueued behind the rest.
    pub fn advance_all(&mut self, epoch: Epoch, rng: &mut SimRng) -> AdvanceTally {
        let mut tally = AdvanceTally::default();
        for _ in 0..self.patients.len() {
            let Some(mut patient) = self.patients.pop_front() else {
                break;
            };
            let outcome = patient.process_patient(epoch, rng);
            tally.advanced += 1;
            tally.attended += outcome.attended as usize;
            tally.extended += outcome.extended as usize;
            self.patients.push_back(patient);
        }
        tally
    }

    /// Move every patient whose course is complete to `discharged`, keeping
    /// the rest in order.  Returns the number discharged.
    pub fn discharge_completed(&mut self, epoch: Epoch, discharged: &mut DischargeList) -> usize {
        let mut count = 0;
        for _ in 0..self.patients.len() {
            let Some(patient) = self.patients.pop_front() else {
                break;
            };
            if patient.is_complete() {
                trace!(patient = %patient.id(), %epoch, "discharged on completion");
                discharged.discharge(patient, epoch);
                count += 1;
            } else {
                self.patients.push_back(patient);
            }
        }
        count
    }

    /// Move every patient to `discharged` regardless of completion.
    pub fn discharge_all(&mut self, epoch: Epoch, discharged: &mut DischargeList) -> usize {
        let count = self.patients.len();
        for patient in self.patients.drain(..) {
            discharged.discharge(patient, epoch);
        }
        count
    }
}
