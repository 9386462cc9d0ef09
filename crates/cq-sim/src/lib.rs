//! `cq-sim`: epoch loop orchestrator for the caseflow simulator.
//!
//! # Epoch loop
//!
//! ```text
//! for epoch in 0..config.n_epochs:
//!   ① Arrivals  - draw a Poisson count; for each arrival draw class, age,
//!                 and modality, then append to the waitlist.
//!   ② Ageing    - waiting patients past the assessment age are discharged
//!                 unserved.
//!   ③ Servers   - every individual server, in construction order.
//!   ④ Groups    - every group server, in construction order.
//!   ⑤ Observe   - observer receives the epoch summary (waitlist length,
//!                 occupancy, admissions, discharges).
//! ```
//!
//! All randomness comes from one [`SimRng`][cq_core::SimRng] owned by the
//! [`Simulation`], consumed in exactly the order above, so a seed fully
//! determines a run.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | [`run_replications`] runs on Rayon's thread pool.       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cq_core::SimConfig;
//! use cq_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default()).build()?;
//! let summary = sim.run(&mut NoopObserver);
//! println!("{} discharged", summary.n_discharged);
//! ```

pub mod arrivals;
pub mod builder;
pub mod error;
pub mod observer;
pub mod replicate;
pub mod sim;

#[cfg(test)]
mod tests;

pub use arrivals::ArrivalGenerator;
pub use builder::{SimBuilder, generate_servers};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use replicate::run_replications;
pub use sim::{EpochSummary, RunSummary, Simulation};
