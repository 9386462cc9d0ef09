//! Simulation time model.
//!
//! Time advances in whole epochs.  One epoch is one scheduling round: every
//! server delivers at most one appointment per occupant per epoch.  The
//! mapping from epochs to calendar time only matters for ageing patients on
//! the waitlist and is held in [`SimConfig::epochs_per_year`][crate::SimConfig].

use std::fmt;

/// An absolute epoch counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epoch(pub u64);

impl Epoch {
    pub const ZERO: Epoch = Epoch(0);

    /// Return the epoch `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Epoch {
        Epoch(self.0 + n)
    }

    /// Epochs elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Epoch) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The following epoch.
    #[inline]
    pub fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}
