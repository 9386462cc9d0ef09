//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DischargeRow, OutputResult, WaitlistRow};

/// Directory, relative to the output folder, holding waitlist samples.
pub const WAITLIST_DIR: &str = "waitlist_data";

/// File name (without extension) of run `run`'s discharge table.
pub fn discharge_file_stem(run: u32) -> String {
    format!("simulation_data_{run}")
}

/// File name (without extension) of run `run`'s waitlist samples.
pub fn waitlist_file_stem(run: u32) -> String {
    format!("waitlist_data_{run}")
}

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Writers open every file in their constructor.  The observer stores errors
/// internally; retrieve them with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of discharged patients.
    fn write_discharges(&mut self, rows: &[DischargeRow]) -> OutputResult<()>;

    /// Write one waitlist sample.  A no-op for writers opened without
    /// waitlist streaming.
    fn write_waitlist_sample(&mut self, row: &WaitlistRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
