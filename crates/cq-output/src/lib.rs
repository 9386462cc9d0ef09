//! `cq-output`: per-run output writers for the caseflow simulator.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created for run `r`                                              |
//! |-----------|---------|------------------------------------------------------------------------|
//! | *(none)*  | CSV     | `simulation_data_r.csv`, `waitlist_data/waitlist_data_r.csv`           |
//! | `sqlite`  | SQLite  | `simulation_r.db` (tables `discharges`, `waitlist`)                    |
//! | `parquet` | Parquet | `simulation_data_r.parquet`, `waitlist_data/waitlist_data_r.parquet`   |
//!
//! The waitlist file only exists when waitlist streaming is enabled.
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `cq_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cq_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"), 0, config.waitlist_logging)?;
//! let mut obs = SimOutputObserver::new(writer, config.waitlist_logging);
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{DischargeRow, WaitlistRow};
pub use writer::{OutputWriter, WAITLIST_DIR, discharge_file_stem, waitlist_file_stem};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use self::parquet::ParquetWriter;
