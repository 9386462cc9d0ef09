//! Appointment attendance outcomes.

use cq_core::{AttendanceRow, SimRng};

use crate::Modality;

/// What happened to one scheduled appointment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attendance {
    Attended,
    PatientCancelled,
    ClinicianCancelled,
    NoShow,
}

impl Attendance {
    const ORDER: [Attendance; 4] = [
        Attendance::Attended,
        Attendance::PatientCancelled,
        Attendance::ClinicianCancelled,
        Attendance::NoShow,
    ];

    #[inline]
    pub fn attended(self) -> bool {
        self == Attendance::Attended
    }
}

/// Cumulative outcome table for both modalities.
///
/// Built once per run from the configured weight rows and copied into every
/// patient.  Each row is normalised so the last cumulative entry is exactly
/// 1.0; a single uniform draw then selects the outcome.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttendanceProbs {
    virtual_cum:   [f64; 4],
    in_person_cum: [f64; 4],
}

impl AttendanceProbs {
    /// Build from raw (non-negative, positive-sum) weight rows.
    pub fn new(virtual_row: AttendanceRow, in_person_row: AttendanceRow) -> Self {
        Self {
            virtual_cum:   cumulative(virtual_row),
            in_person_cum: cumulative(in_person_row),
        }
    }

    /// Every appointment is attended.  Useful for deterministic scenarios.
    pub fn always_attend() -> Self {
        Self::new([1.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0])
    }

    /// Draw the outcome of one appointment.  Consumes exactly one value from
    /// `rng`.
    pub fn draw(&self, modality: Modality, rng: &mut SimRng) -> Attendance {
        let row = match modality {
            Modality::Virtual  => &self.virtual_cum,
            Modality::InPerson => &self.in_person_cum,
        };
        let u = rng.unit();
        row.iter()
            .position(|&c| u < c)
            .map(|i| Attendance::ORDER[i])
            .unwrap_or(Attendance::NoShow)
    }
}

fn cumulative(row: AttendanceRow) -> [f64; 4] {
    let total: f64 = row.iter().sum();
    let mut out = [0.0; 4];
    let mut acc = 0.0;
    for (slot, w) in out.iter_mut().zip(row) {
        acc += w;
        *slot = if total > 0.0 { acc / total } else { 0.0 };
    }
    // Guard against rounding leaving the last bucket just below 1.0.
    if total > 0.0 {
        out[3] = 1.0;
    }
    out
}
