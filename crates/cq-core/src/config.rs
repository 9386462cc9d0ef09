//! Top-level run configuration.
//!
//! `SimConfig` is plain data.  Applications build it from command-line
//! options or (with the `serde` feature) from a JSON file, then hand it to
//! `cq_sim::SimBuilder`, which calls [`SimConfig::validate`] before any
//! epoch runs.  Per-class parameters are parallel vectors indexed by
//! [`ClassId`].

use crate::{ClassId, CqError, CqResult, SimRng};

/// Cumulative-free outcome probabilities for one appointment modality:
/// `[attended, patient cancelled, clinician cancelled, no-show]`.
///
/// Rows need not sum to one; they are used as relative weights.
pub type AttendanceRow = [f64; 4];

/// Every tunable of a single run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Number of epochs to simulate.
    pub n_epochs: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    // ── Plain servers ─────────────────────────────────────────────────────
    /// Number of individual-service servers.
    pub n_servers: usize,

    /// Caseload capacity of every individual-service server.
    pub max_caseload: usize,

    /// Class served by each plain server.  Empty means every server draws
    /// from all classes in waitlist priority order.
    pub server_classes: Vec<u32>,

    // ── Group servers ─────────────────────────────────────────────────────
    /// Group servers to create for each class (indexed by class).
    pub n_group_servers: Vec<u32>,

    /// Share of each class's group servers with group size `j + 1`.
    pub group_size_props: Vec<f64>,

    /// Session-count modifier for group size `j + 1`.
    pub group_size_effects: Vec<f64>,

    // ── Arrivals ──────────────────────────────────────────────────────────
    /// Mean arrivals per epoch (Poisson λ).
    pub arr_lam: f64,

    /// Relative arrival weight of each class.
    pub arrival_probs: Vec<f64>,

    /// Age at arrival ~ Normal(age_mean, age_sd) in years.  Draws below
    /// `age_cutoff` become `age_min`; draws above `age_max` become `age_max`.
    pub age_mean:   f64,
    pub age_sd:     f64,
    pub age_min:    f64,
    pub age_cutoff: f64,
    pub age_max:    f64,

    // ── Per-class patient parameters ──────────────────────────────────────
    /// Nominal appointment count of each class's pathway.
    pub pathways: Vec<u32>,

    /// Strength of the waiting-time effect on extensions, per class.
    pub wait_effects: Vec<f64>,

    /// Relative change in required appointments under virtual delivery.
    pub modality_effects: Vec<f64>,

    /// Probability that a patient of the class is served virtually.
    pub modality_policies: Vec<f64>,

    /// Outcome weights for virtual appointments.
    pub virtual_att_probs: AttendanceRow,

    /// Outcome weights for in-person appointments.
    pub face_att_probs: AttendanceRow,

    // ── Waitlist ──────────────────────────────────────────────────────────
    /// Patients older than this (years) leave the waitlist unserved.
    pub max_ax_age: f64,

    /// Calendar scale used to age waiting patients.
    pub epochs_per_year: u32,

    /// Epochs a patient must wait before becoming eligible for admission.
    pub min_wait_epochs: u64,

    /// Shared servers draw classes in `priority_order` when set, otherwise
    /// strictly by arrival time.
    pub priority_wlist: bool,
    pub priority_order: Vec<u32>,

    /// Patients placed on the waitlist at epoch 0 before the run starts.
    pub waitlist_prefill: usize,

    /// Stream `(epoch, waitlist length)` samples to the output sink.
    pub waitlist_logging: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_epochs:           10_000,
            seed:               42,
            n_servers:          80,
            max_caseload:       1,
            server_classes:     vec![],
            n_group_servers:    vec![0, 0, 0],
            group_size_props:   vec![0.0, 0.33, 0.33, 0.33],
            group_size_effects: vec![0.0; 4],
            arr_lam:            10.0,
            arrival_probs:      vec![0.33; 3],
            age_mean:           1.5,
            age_sd:             1.0,
            age_min:            0.25,
            age_cutoff:         0.5,
            age_max:            2.5,
            pathways:           vec![7, 10, 13],
            wait_effects:       vec![0.6; 3],
            modality_effects:   vec![0.5, 0.0, -0.5],
            modality_policies:  vec![0.5, 0.0, 1.0],
            virtual_att_probs:  [0.9, 0.025, 0.025, 0.05],
            face_att_probs:     [0.8, 0.05, 0.05, 0.1],
            max_ax_age:         3.0,
            epochs_per_year:    52,
            min_wait_epochs:    0,
            priority_wlist:     true,
            priority_order:     vec![0, 1, 2],
            waitlist_prefill:   0,
            waitlist_logging:   false,
        }
    }
}

impl SimConfig {
    /// Number of patient classes (= number of pathways).
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.pathways.len()
    }

    /// Iterate all configured classes in index order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.n_classes() as u32).map(ClassId)
    }

    /// Seed for replication `run` of a batch started from this config.
    #[inline]
    pub fn seed_for_run(&self, run: u32) -> u64 {
        SimRng::run_seed(self.seed, run)
    }

    /// Check every setup-time invariant.  The epoch loop relies on these and
    /// performs no validation of its own.
    pub fn validate(&self) -> CqResult<()> {
        let n = self.n_classes();
        if n == 0 {
            return Err(CqError::Config("at least one pathway is required".into()));
        }

        check_len("wait_effects", n, self.wait_effects.len())?;
        check_len("modality_effects", n, self.modality_effects.len())?;
        check_len("modality_policies", n, self.modality_policies.len())?;
        check_len("arrival_probs", n, self.arrival_probs.len())?;
        check_len("n_group_servers", n, self.n_group_servers.len())?;
        check_len("priority_order", n, self.priority_order.len())?;
        check_len(
            "group_size_effects",
            self.group_size_props.len(),
            self.group_size_effects.len(),
        )?;

        if !self.server_classes.is_empty() {
            check_len("server_classes", self.n_servers, self.server_classes.len())?;
            if let Some(&c) = self.server_classes.iter().find(|&&c| c as usize >= n) {
                return Err(CqError::UnknownClass(ClassId(c)));
            }
        }

        if self.n_servers > 0 && self.max_caseload == 0 {
            return Err(CqError::Config(
                "max_caseload must be at least 1 when plain servers are configured".into(),
            ));
        }

        if !self.arr_lam.is_finite() || self.arr_lam < 0.0 {
            return Err(CqError::Config(format!("invalid arrival rate {}", self.arr_lam)));
        }
        check_weights("arrival_probs", &self.arrival_probs)?;
        check_weights("virtual_att_probs", &self.virtual_att_probs)?;
        check_weights("face_att_probs", &self.face_att_probs)?;

        if self.group_size_props.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(CqError::Config("group_size_props must be non-negative".into()));
        }
        if self.group_size_effects.iter().any(|e| !e.is_finite()) {
            return Err(CqError::Config("group_size_effects must be finite".into()));
        }
        if self.modality_policies.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(CqError::Config("modality_policies must lie in [0, 1]".into()));
        }

        if !self.age_mean.is_finite() || !self.age_sd.is_finite() || self.age_sd < 0.0 {
            return Err(CqError::Config("age distribution parameters must be finite, sd >= 0".into()));
        }
        if !(self.age_min <= self.age_cutoff && self.age_cutoff <= self.age_max) {
            return Err(CqError::Config(format!(
                "age bounds must satisfy age_min {} <= age_cutoff {} <= age_max {}",
                self.age_min, self.age_cutoff, self.age_max
            )));
        }
        if self.epochs_per_year == 0 {
            return Err(CqError::Config("epochs_per_year must be positive".into()));
        }

        let mut seen = vec![false; n];
        for &c in &self.priority_order {
            match seen.get_mut(c as usize) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(CqError::Config(format!(
                        "priority_order lists class {c} more than once"
                    )));
                }
                None => return Err(CqError::UnknownClass(ClassId(c))),
            }
        }

        Ok(())
    }

    /// Plain servers needed to run at `utilization` given the offered load
    /// `Σ p_i · λ · pathway_i` (appointments demanded per epoch).
    ///
    /// Class weights are normalised, so `arrival_probs` need not sum to one.
    pub fn servers_for_utilization(&self, utilization: f64) -> CqResult<usize> {
        if !(utilization > 0.0 && utilization.is_finite()) {
            return Err(CqError::Config(format!("invalid utilization {utilization}")));
        }
        check_len("arrival_probs", self.n_classes(), self.arrival_probs.len())?;
        let total: f64 = self.arrival_probs.iter().sum();
        if total <= 0.0 {
            return Err(CqError::Config("arrival_probs must have a positive sum".into()));
        }
        let load: f64 = self
            .arrival_probs
            .iter()
            .zip(&self.pathways)
            .map(|(p, &len)| p / total * self.arr_lam * len as f64)
            .sum();
        Ok((load / utilization).ceil() as usize)
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> CqResult<()> {
    if expected != got {
        return Err(CqError::LengthMismatch { what, expected, got });
    }
    Ok(())
}

fn check_weights(what: &str, weights: &[f64]) -> CqResult<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(CqError::Config(format!("{what} must be finite and non-negative")));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(CqError::Config(format!("{what} must have a positive sum")));
    }
    Ok(())
}
