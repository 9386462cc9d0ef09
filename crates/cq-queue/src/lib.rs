//! `cq-queue`: where patients live when they are not in a caseload.
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`waitlist`]  | `Waitlist`, `WaitlistPolicy`, `Intake`                 |
//! | [`discharge`] | `DischargeList` - append-only record of finished care  |
//!
//! A patient is owned by exactly one of: the waitlist, one server caseload,
//! or the discharge list.  Moves between them are by value, so the type
//! system enforces that a patient is never in two places at once.

pub mod discharge;
pub mod waitlist;


pub use discharge::DischargeList;
pub use waitlist::{Intake, Waitlist, WaitlistPolicy};
