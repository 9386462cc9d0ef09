//! `cq-server`: capacity-bound service units.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`context`]  | `ServiceContext<'a>` - mutable borrows shared by all units   |
//! | [`caseload`] | `Caseload` - bounded FIFO of patients, shared bookkeeping    |
//! | [`server`]   | `Server` - individual service, continuous refill             |
//! | [`group`]    | `GroupServer`, `CohortState` - synchronized cohort service   |
//! | [`unit`]     | `ServiceUnit` (closed set of unit kinds), `EpochReport`      |
//!
//! # Two policies, one step
//!
//! Both unit kinds advance once per epoch through
//! [`ServiceUnit::process_epoch`].  They differ only in when patients enter
//! and leave:
//!
//! ```text
//!                 admission                      discharge
//! Server          top up to capacity every epoch  each patient on completion
//! GroupServer     whole cohort, only when empty    whole cohort when the shared
//!                                                  session countdown hits zero
//! ```

pub mod caseload;
pub mod context;
pub mod group;
pub mod server;
pub mod unit;


pub use caseload::{AdvanceTally, Caseload};
pub use context::ServiceContext;
pub use group::{CohortState, GroupServer};
pub use server::Server;
pub use unit::{EpochReport, ServiceUnit};
