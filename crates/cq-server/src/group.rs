//! `GroupServer`: a synchronized therapy group.
//!
//! # Slot state machine
//!
//! ```text
//!            admit ≥ 1                 sessions_left > 1
//!   Empty ─────────────▶ Active ◀───────────────────────┐
//!     ▲                    │  advance all, sessions -= 1 │
//!     │                    └─────────────────────────────┘
//!     │ bulk discharge           │ sessions_left reaches 0
//!     └──────────────────────────┘
//! ```
//!
//! A cohort forms only when the slot is empty.  It takes as many eligible
//! patients as are available up to the group size and never waits to fill.
//! Every member attends every session together; when the countdown reaches
//! zero the whole cohort is discharged, whether or not each member's own
//! course is complete.  Membership never changes while a cohort is active.
//!
//! The countdown length `round(path_len · (1 + group_size_effect))` belongs
//! to the slot, not to its members, and is the same for every cohort.  A
//! countdown of zero still runs one session, since a formed cohort always
//! meets at least once.

use cq_core::{ClassId, Epoch, PatientId};
use cq_patient::Patient;
use cq_queue::Intake;
use tracing::trace;

use crate::{Caseload, EpochReport, ServiceContext};

/// Lifecycle of a group slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CohortState {
    /// No cohort; the next epoch tries to form one.
    Empty,
    /// A cohort is meeting.  `sessions_left` counts down to bulk discharge.
    Active { sessions_left: u32 },
}

#[derive(Debug)]
pub struct GroupServer {
    class:             ClassId,
    path_len:          u32,
    group_size_effect: f64,
    /// Sessions every cohort in this slot receives.
    sessions:          u32,
    caseload:          Caseload,
    state:             CohortState,
}

impl GroupServer {
    pub fn new(class: ClassId, path_len: u32, group_size: usize, group_size_effect: f64) -> Self {
        Self {
            class,
            path_len,
            group_size_effect,
            sessions: session_count(path_len, group_size_effect),
            caseload: Caseload::new(group_size),
            state: CohortState::Empty,
        }
    }

    /// One epoch step:
    ///
    /// 1. if empty, form a cohort (idle this epoch if nobody is eligible);
    /// 2. advance every member by one session;
    /// 3. count the session down and discharge the cohort at zero.
    pub fn process_epoch(&mut self, epoch: Epoch, ctx: &mut ServiceContext<'_>) -> EpochReport {
        let mut admitted = 0;
        let sessions_left = match self.state {
            CohortState::Active { sessions_left } => sessions_left,
            CohortState::Empty => {
                admitted = self.caseload.fill_from(ctx.waitlist, Intake::Class(self.class), epoch);
                if admitted == 0 {
                    return EpochReport::default();
                }
                trace!(class = %self.class, members = admitted, sessions = self.sessions, %epoch,
                       "cohort formed");
                self.sessions
            }
        };

        // Every member uses a session whether or not the appointment happened.
        let tally = self.caseload.advance_all(epoch, ctx.rng);

        let sessions_left = sessions_left.saturating_sub(1);
        let discharged = if sessions_left == 0 {
            self.state = CohortState::Empty;
            let n = self.caseload.discharge_all(epoch, ctx.discharged);
            trace!(class = %self.class, members = n, %epoch, "cohort discharged");
            n
        } else {
            self.state = CohortState::Active { sessions_left };
            0
        };

        EpochReport::new(admitted, tally, discharged)
    }

    /// Sessions remaining for the current cohort; zero when empty.
    pub fn n_appts(&self) -> u32 {
        match self.state {
            CohortState::Empty => 0,
            CohortState::Active { sessions_left } => sessions_left,
        }
    }

    #[inline]
    pub fn state(&self) -> CohortState {
        self.state
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn path_len(&self) -> u32 {
        self.path_len
    }

    #[inline]
    pub fn group_size_effect(&self) -> f64 {
        self.group_size_effect
    }

    /// Countdown length given to every new cohort.
    #[inline]
    pub fn session_count(&self) -> u32 {
        self.sessions
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

    pub fn members(&self) -> Vec<PatientId> {
        self.caseload.ids()
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.caseload.patients()
    }
}

/// `round(path_len · (1 + effect))`, floored at zero.
pub fn session_count(path_len: u32, group_size_effect: f64) -> u32 {
    (path_len as f64 * (1.0 + group_size_effect)).round().max(0.0) as u32
}
