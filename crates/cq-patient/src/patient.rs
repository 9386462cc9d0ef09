//! The `Patient` entity.
//!
//! # Course of treatment
//!
//! A patient needs `required_appts` attended appointments.  Every epoch it
//! spends in a caseload, [`Patient::process_patient`] draws one attendance
//! outcome:
//!
//! - **Attended** counts toward the course.  When the attended count reaches
//!   the requirement, an extension may be granted (see below), raising the
//!   requirement by [`extension_len`][Patient::extension_len].
//! - **Any other outcome** is a missed appointment.  It delays completion by
//!   one epoch and is added to the patient's total wait time.
//!
//! # Extensions
//!
//! Longer waits make extensions more likely.  With `w` the epochs spent on the
//! waitlist and `d` the nominal pathway length, the extension probability at
//! the completing appointment is `wait_effect · w / (w + d)`.  At most
//! [`MAX_EXTENSIONS`] extensions are granted, so every individually served
//! patient eventually completes.

use cq_core::{ClassId, Epoch, PatientId, SimRng};

use crate::{AttendanceProbs, ClassProfile, Modality};

/// Upper bound on extensions per patient.
pub const MAX_EXTENSIONS: u32 = 3;

/// Result of advancing a patient by one appointment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub attended: bool,
    pub extended: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patient {
    id:              PatientId,
    class:           ClassId,
    arrival:         Epoch,
    /// Age in years at arrival.
    arrival_age:     f64,
    base_duration:   u32,
    wait_effect:     f64,
    modality:        Modality,
    attendance:      AttendanceProbs,

    required_appts:  u32,
    n_appts:         u32,
    n_missed:        u32,
    n_ext:           u32,
    first_appt:      Option<Epoch>,
    discharge:       Option<Epoch>,
}

impl Patient {
    pub fn new(
        id:          PatientId,
        arrival:     Epoch,
        arrival_age: f64,
        profile:     &ClassProfile,
        modality:    Modality,
        attendance:  AttendanceProbs,
    ) -> Self {
        Self {
            id,
            class: profile.class,
            arrival,
            arrival_age,
            base_duration: profile.pathway_len,
            wait_effect: profile.wait_effect,
            modality,
            attendance,
            required_appts: profile.required_appts(modality),
            n_appts: 0,
            n_missed: 0,
            n_ext: 0,
            first_appt: None,
            discharge: None,
        }
    }

    /// Advance by one appointment at `epoch`.
    ///
    /// Must be called at most once per epoch, and only while the patient is
    /// in a caseload.
    pub fn process_patient(&mut self, epoch: Epoch, rng: &mut SimRng) -> AdvanceOutcome {
        if self.first_appt.is_none() {
            self.first_appt = Some(epoch);
        }

        if !self.attendance.draw(self.modality, rng).attended() {
            self.n_missed += 1;
            return AdvanceOutcome { attended: false, extended: false };
        }

        self.n_appts += 1;
        let extended = self.n_appts == self.required_appts && self.draw_extension(rng);
        if extended {
            self.n_ext += 1;
            self.required_appts += self.extension_len();
        }
        AdvanceOutcome { attended: true, extended }
    }

    fn draw_extension(&self, rng: &mut SimRng) -> bool {
        if self.n_ext >= MAX_EXTENSIONS {
            return false;
        }
        let p = self.extension_probability();
        p > 0.0 && rng.gen_bool(p)
    }

    /// Probability that the completing appointment triggers an extension.
    pub fn extension_probability(&self) -> f64 {
        let waited = self.waitlist_wait().unwrap_or(0) as f64;
        let denom = waited + self.base_duration as f64;
        if self.wait_effect <= 0.0 || denom <= 0.0 {
            return 0.0;
        }
        (self.wait_effect * waited / denom).clamp(0.0, 1.0)
    }

    /// Appointments added by one extension: half the pathway, at least one.
    pub fn extension_len(&self) -> u32 {
        self.base_duration.div_ceil(2).max(1)
    }

    /// `true` once every required appointment has been attended.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.n_appts >= self.required_appts
    }

    /// Record the discharge epoch.  Called exactly once, when the patient is
    /// handed to the discharge list.
    pub fn set_discharge_time(&mut self, epoch: Epoch) {
        debug_assert!(self.discharge.is_none(), "patient {} discharged twice", self.id);
        self.discharge = Some(epoch);
    }

    /// Age in years at `epoch`.
    pub fn age_at(&self, epoch: Epoch, epochs_per_year: u32) -> f64 {
        self.arrival_age + epoch.since(self.arrival) as f64 / epochs_per_year.max(1) as f64
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> PatientId { self.id }
    #[inline] pub fn pathway(&self) -> ClassId { self.class }
    #[inline] pub fn arrival_t(&self) -> Epoch { self.arrival }
    #[inline] pub fn arrival_age(&self) -> f64 { self.arrival_age }
    #[inline] pub fn base_duration(&self) -> u32 { self.base_duration }
    #[inline] pub fn modality(&self) -> Modality { self.modality }
    #[inline] pub fn required_appts(&self) -> u32 { self.required_appts }
    #[inline] pub fn n_appts(&self) -> u32 { self.n_appts }
    #[inline] pub fn n_missed(&self) -> u32 { self.n_missed }
    #[inline] pub fn n_ext(&self) -> u32 { self.n_ext }
    #[inline] pub fn first_appt(&self) -> Option<Epoch> { self.first_appt }
    #[inline] pub fn discharge_time(&self) -> Option<Epoch> { self.discharge }

    /// Epochs spent on the waitlist: until the first appointment, or until
    /// discharge for patients who left the waitlist unserved.
    pub fn waitlist_wait(&self) -> Option<u64> {
        self.first_appt
            .or(self.discharge)
            .map(|e| e.since(self.arrival))
    }

    /// Arrival to discharge, in epochs.  `None` until discharged.
    pub fn sojourn_time(&self) -> Option<u64> {
        self.discharge.map(|e| e.since(self.arrival))
    }

    /// Waitlist wait plus every epoch lost to a missed appointment.
    pub fn total_wait_time(&self) -> Option<u64> {
        self.waitlist_wait().map(|w| w + self.n_missed as u64)
    }
}
