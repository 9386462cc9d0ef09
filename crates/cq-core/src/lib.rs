//! `cq-core`: foundational types for the `caseflow` service-queue simulator.
//!
//! This crate is a dependency of every other `cq-*` crate.  It has no `cq-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PatientId`, `ClassId`                                |
//! | [`time`]        | `Epoch`                                               |
//! | [`rng`]         | `SimRng` (the single per-run random stream)           |
//! | [`config`]      | `SimConfig` and its validation                        |
//! | [`error`]       | `CqError`, `CqResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types (JSON config) |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AttendanceRow, SimConfig};
pub use error::{CqError, CqResult};
pub use ids::{ClassId, PatientId};
pub use rng::SimRng;
pub use time::Epoch;
