//! Plain data row types written by output backends.

use cq_patient::Patient;

/// Outcome of one discharged patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DischargeRow {
    pub patient_id:       u32,
    pub pathway:          u32,
    pub base_duration:    u32,
    pub arrival_epoch:    u64,
    /// `None` for patients discharged from the waitlist without service.
    pub first_appt_epoch: Option<u64>,
    pub n_appts:          u32,
    pub discharge_epoch:  u64,
    pub n_ext:            u32,
    pub sojourn_time:     u64,
    pub total_wait_time:  u64,
}

impl DischargeRow {
    /// Row for `patient`, or `None` if it has not been discharged.
    pub fn from_patient(patient: &Patient) -> Option<Self> {
        let discharge = patient.discharge_time()?;
        Some(Self {
            patient_id:       patient.id().0,
            pathway:          patient.pathway().0,
            base_duration:    patient.base_duration(),
            arrival_epoch:    patient.arrival_t().0,
            first_appt_epoch: patient.first_appt().map(|e| e.0),
            n_appts:          patient.n_appts(),
            discharge_epoch:  discharge.0,
            n_ext:            patient.n_ext(),
            sojourn_time:     discharge.since(patient.arrival_t()),
            total_wait_time:  patient.total_wait_time().unwrap_or(0),
        })
    }
}

/// Waitlist length sampled at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitlistRow {
    pub epoch:        u64,
    pub waitlist_len: u64,
}
