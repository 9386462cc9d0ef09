//! `cq-patient`: the patient stochastic-outcome model.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`attendance`] | `Attendance` outcomes, `AttendanceProbs` sampling table    |
//! | [`profile`]    | `ClassProfile` (per-class parameters), `Modality`         |
//! | [`patient`]    | `Patient`, `AdvanceOutcome`                               |
//!
//! A patient is advanced by exactly one appointment per epoch while it sits
//! in a server caseload.  Servers decide *when* to discharge; the patient
//! only reports whether its own course is complete.

pub mod attendance;
pub mod patient;
pub mod profile;

#[cfg(test)]
mod tests;

pub use attendance::{Attendance, AttendanceProbs};
pub use patient::{AdvanceOutcome, MAX_EXTENSIONS, Patient};
pub use profile::{ClassProfile, Modality};
