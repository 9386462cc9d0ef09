//! `Waitlist`: per-class FIFO queues with priority-ordered intake.
//!
//! # Eligibility
//!
//! A waiting patient is eligible for admission at `epoch` once it has waited
//! at least `min_wait_epochs`.  Each class queue is ordered by arrival, so
//! only the front of a queue ever needs checking.
//!
//! # Intake order
//!
//! A server dedicated to one class takes the front of that class's queue.
//! A shared server ([`Intake::Any`]) takes either the first class in
//! `priority_order` with an eligible patient, or (priority off) the eligible
//! patient that arrived earliest, ties going to the lower class index.
//!
//! # Ageing out
//!
//! Patients whose age exceeds `max_ax_age` while waiting are past the
//! assessment window.  [`Waitlist::purge_aged_out`] hands them straight to the
//! discharge list without ever being served.

use std::collections::VecDeque;

use cq_core::{ClassId, Epoch, SimConfig};
use cq_patient::Patient;
use tracing::trace;

use crate::DischargeList;

/// Which part of the waitlist a server draws from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intake {
    /// Any class, in waitlist priority order.
    Any,
    /// Only the given class.
    Class(ClassId),
}

/// Ordering and eligibility rules.
#[derive(Clone, Debug, PartialEq)]
pub struct WaitlistPolicy {
    pub priority:        bool,
    pub priority_order:  Vec<ClassId>,
    pub min_wait_epochs: u64,
    pub max_ax_age:      f64,
    pub epochs_per_year: u32,
}

impl WaitlistPolicy {
    /// Plain FIFO: no priority, no minimum wait, nobody ages out.
    pub fn fifo() -> Self {
        Self {
            priority:        false,
            priority_order:  vec![],
            min_wait_epochs: 0,
            max_ax_age:      f64::INFINITY,
            epochs_per_year: 52,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            priority:        config.priority_wlist,
            priority_order:  config.priority_order.iter().map(|&c| ClassId(c)).collect(),
            min_wait_epochs: config.min_wait_epochs,
            max_ax_age:      config.max_ax_age,
            epochs_per_year: config.epochs_per_year,
        }
    }
}

/// Patients admitted to the service but not yet in a caseload.
#[derive(Debug)]
pub struct Waitlist {
    queues: Vec<VecDeque<Patient>>,
    policy: WaitlistPolicy,
    /// Cached total for O(1) `len_waitlist()`.
    total:  usize,
}

impl Waitlist {
    pub fn new(n_classes: usize, policy: WaitlistPolicy) -> Self {
        Self {
            queues: (0..n_classes).map(|_| VecDeque::new()).collect(),
            policy,
            total: 0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.n_classes(), WaitlistPolicy::from_config(config))
    }

    pub fn policy(&self) -> &WaitlistPolicy {
        &self.policy
    }

    /// Append `patient` to the back of its class queue.
    ///
    /// # Panics
    /// Panics if the patient's class was not configured.
    pub fn add_patient(&mut self, patient: Patient, epoch: Epoch) {
        trace!(patient = %patient.id(), class = %patient.pathway(), %epoch, "waitlisted");
        self.queues[patient.pathway().index()].push_back(patient);
        self.total += 1;
    }

    /// `true` iff a patient of `class` can be admitted at `epoch`.
    pub fn check_class_availability(&self, class: ClassId, epoch: Epoch) -> bool {
        self.front_eligible(class.index(), epoch)
    }

    /// Remove and return the next patient for `intake`, or `None` if nobody
    /// is eligible.
    pub fn pop_eligible(&mut self, intake: Intake, epoch: Epoch) -> Option<Patient> {
        let class = self.select(intake, epoch)?;
        let patient = self.queues[class].pop_front()?;
        self.total -= 1;
        Some(patient)
    }

    /// Total waiting patients across all classes.
    pub fn len_waitlist(&self) -> usize {
        self.total
    }

    pub fn len_class(&self, class: ClassId) -> usize {
        self.queues.get(class.index()).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Discharge every waiting patient older than `max_ax_age` at `epoch`.
    /// Returns the number removed.
    pub fn purge_aged_out(&mut self, epoch: Epoch, discharged: &mut DischargeList) -> usize {
        let max_age = self.policy.max_ax_age;
        if !max_age.is_finite() {
            return 0;
        }
        let per_year = self.policy.epochs_per_year;

        let mut removed = 0;
        for queue in &mut self.queues {
            if !queue.iter().any(|p| p.age_at(epoch, per_year) > max_age) {
                continue;
            }
            let mut kept = VecDeque::with_capacity(queue.len());
            for patient in queue.drain(..) {
                if patient.age_at(epoch, per_year) > max_age {
                    trace!(patient = %patient.id(), %epoch, "aged out of waitlist");
                    discharged.discharge(patient, epoch);
                    removed += 1;
                } else {
                    kept.push_back(patient);
                }
            }
            *queue = kept;
        }
        self.total -= removed;
        removed
    }

    // ── Selection ─────────────────────────────────────────────────────────

    fn front_eligible(&self, class: usize, epoch: Epoch) -> bool {
        self.queues
            .get(class)
            .and_then(VecDeque::front)
            .is_some_and(|p| epoch.since(p.arrival_t()) >= self.policy.min_wait_epochs
                && epoch >= p.arrival_t())
    }

    fn select(&self, intake: Intake, epoch: Epoch) -> Option<usize> {
        match intake {
            Intake::Class(c) => self.front_eligible(c.index(), epoch).then_some(c.index()),
            Intake::Any if self.policy.priority => self
                .policy
                .priority_order
                .iter()
                .map(|c| c.index())
                .find(|&c| self.front_eligible(c, epoch)),
            Intake::Any => (0..self.queues.len())
                .filter(|&c| self.front_eligible(c, epoch))
                .min_by_key(|&c| (self.queues[c][0].arrival_t(), c)),
        }
    }
}
