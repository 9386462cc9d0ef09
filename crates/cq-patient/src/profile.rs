//! Per-class patient parameters.

use cq_core::{ClassId, CqError, CqResult, SimConfig, SimRng};

/// How a patient's appointments are delivered.  Fixed at arrival.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modality {
    Virtual,
    InPerson,
}

/// The parameters every patient of one class is created with.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassProfile {
    pub class:           ClassId,
    /// Nominal appointment count of the class's pathway.
    pub pathway_len:     u32,
    pub wait_effect:     f64,
    pub modality_effect: f64,
    /// Probability of virtual delivery.
    pub modality_policy: f64,
}

impl ClassProfile {
    /// Profile with no wait, modality, or virtual-delivery effects.
    pub fn plain(class: ClassId, pathway_len: u32) -> Self {
        Self {
            class,
            pathway_len,
            wait_effect:     0.0,
            modality_effect: 0.0,
            modality_policy: 0.0,
        }
    }

    /// Read the profile for `class` out of the per-class config vectors.
    pub fn from_config(config: &SimConfig, class: ClassId) -> CqResult<Self> {
        let i = class.index();
        let get = |v: &[f64]| v.get(i).copied().ok_or(CqError::UnknownClass(class));
        Ok(Self {
            class,
            pathway_len:     *config.pathways.get(i).ok_or(CqError::UnknownClass(class))?,
            wait_effect:     get(&config.wait_effects)?,
            modality_effect: get(&config.modality_effects)?,
            modality_policy: get(&config.modality_policies)?,
        })
    }

    /// Profiles for every configured class, indexed by `ClassId`.
    pub fn all_from_config(config: &SimConfig) -> CqResult<Vec<Self>> {
        config.classes().map(|c| Self::from_config(config, c)).collect()
    }

    /// Draw a delivery modality for a new arrival.  Consumes exactly one
    /// value from `rng`.
    pub fn draw_modality(&self, rng: &mut SimRng) -> Modality {
        if rng.unit() < self.modality_policy {
            Modality::Virtual
        } else {
            Modality::InPerson
        }
    }

    /// Appointments needed to complete the pathway under `modality`, before
    /// any extensions.
    pub fn required_appts(&self, modality: Modality) -> u32 {
        match modality {
            Modality::InPerson => self.pathway_len,
            Modality::Virtual => {
                let scaled = (self.pathway_len as f64 * (1.0 + self.modality_effect)).round();
                scaled.max(0.0) as u32
            }
        }
    }
}
