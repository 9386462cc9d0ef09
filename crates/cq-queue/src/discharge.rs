//! `DischargeList`: the terminal owner of every finished patient.

use cq_core::Epoch;
use cq_patient::Patient;

/// Append-only record of discharged patients, in discharge order.
#[derive(Debug, Default)]
pub struct DischargeList {
    patients: Vec<Patient>,
}

impl DischargeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a patient whose discharge time is already set.
    pub fn add_patient(&mut self, patient: Patient) {
        debug_assert!(
            patient.discharge_time().is_some(),
            "patient {} added without a discharge time",
            patient.id()
        );
        self.patients.push(patient);
    }

    /// Stamp `patient` with `epoch` and append it.
    pub fn discharge(&mut self, mut patient: Patient, epoch: Epoch) {
        patient.set_discharge_time(epoch);
        self.add_patient(patient);
    }

    pub fn n_patients(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Every discharged patient, oldest discharge first.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }
}
