//! Stochastic arrival generation.
//!
//! Each epoch draws `n ~ Poisson(arr_lam)` new patients.  Every arrival then
//! draws, in this order: class (`WeightedIndex` over `arrival_probs`), age
//! (`Normal(age_mean, age_sd)`, see [`ArrivalGenerator::draw_age`]), and
//! delivery modality (Bernoulli on the class's modality policy).

use cq_core::{Epoch, PatientId, SimConfig, SimRng};
use cq_patient::{AttendanceProbs, ClassProfile, Patient};
use rand::distributions::WeightedIndex;
use rand_distr::{Normal, Poisson};

use crate::{SimError, SimResult};

pub struct ArrivalGenerator {
    /// `None` when the arrival rate is zero.
    count_dstb: Option<Poisson<f64>>,
    class_dstb: WeightedIndex<f64>,
    age_dstb:   Normal<f64>,
    age_min:    f64,
    age_cutoff: f64,
    age_max:    f64,
    profiles:   Vec<ClassProfile>,
    attendance: AttendanceProbs,
    next_id:    u32,
}

impl ArrivalGenerator {
    /// Build every distribution from a validated config.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        let count_dstb = if config.arr_lam > 0.0 {
            Some(Poisson::new(config.arr_lam).map_err(|e| SimError::Distribution {
                what:   "arrival count",
                reason: e.to_string(),
            })?)
        } else {
            None
        };
        let class_dstb =
            WeightedIndex::new(&config.arrival_probs).map_err(|e| SimError::Distribution {
                what:   "arrival class",
                reason: e.to_string(),
            })?;
        let age_dstb =
            Normal::new(config.age_mean, config.age_sd).map_err(|e| SimError::Distribution {
                what:   "arrival age",
                reason: e.to_string(),
            })?;

        Ok(Self {
            count_dstb,
            class_dstb,
            age_dstb,
            age_min: config.age_min,
            age_cutoff: config.age_cutoff,
            age_max: config.age_max,
            profiles: ClassProfile::all_from_config(config)?,
            attendance: AttendanceProbs::new(config.virtual_att_probs, config.face_att_probs),
            next_id: 0,
        })
    }

    /// Number of arrivals this epoch.
    pub fn draw_count(&self, rng: &mut SimRng) -> usize {
        match &self.count_dstb {
            Some(d) => rng.sample::<f64, _>(d) as usize,
            None => 0,
        }
    }

    /// Age at arrival.  Draws under `age_cutoff` snap to `age_min` and
    /// draws over `age_max` snap to `age_max`.
    pub fn draw_age(&self, rng: &mut SimRng) -> f64 {
        let age: f64 = rng.sample(&self.age_dstb);
        if age < self.age_cutoff {
            self.age_min
        } else {
            age.min(self.age_max)
        }
    }

    /// Create one new patient arriving at `epoch`.
    pub fn generate(&mut self, epoch: Epoch, rng: &mut SimRng) -> Patient {
        let class: usize = rng.sample(&self.class_dstb);
        let age = self.draw_age(rng);
        let profile = &self.profiles[class];
        let modality = profile.draw_modality(rng);

        let id = PatientId(self.next_id);
        self.next_id += 1;
        Patient::new(id, epoch, age, profile, modality, self.attendance)
    }
}
