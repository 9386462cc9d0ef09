//! CSV output backend.
//!
//! Creates, for run `r`, in the configured output directory:
//! - `simulation_data_r.csv`
//! - `waitlist_data/waitlist_data_r.csv` (waitlist streaming only)

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::{OutputWriter, WAITLIST_DIR, discharge_file_stem, waitlist_file_stem};
use crate::{DischargeRow, OutputResult, WaitlistRow};

const DISCHARGE_HEADER: [&str; 10] = [
    "patient_id",
    "pathway",
    "base_duration",
    "arrival_epoch",
    "first_appt_epoch",
    "n_appts",
    "discharge_epoch",
    "n_ext",
    "sojourn_time",
    "total_wait_time",
];

/// Writes one run's output to CSV files.
pub struct CsvWriter {
    discharges: Writer<File>,
    waitlist:   Option<Writer<File>>,
    finished:   bool,
}

impl CsvWriter {
    /// Create run `run`'s files in `dir` and write the header rows.
    ///
    /// The waitlist file (and its directory) is only created when
    /// `stream_waitlist` is set.
    pub fn new(dir: &Path, run: u32, stream_waitlist: bool) -> OutputResult<Self> {
        let path = dir.join(format!("{}.csv", discharge_file_stem(run)));
        let mut discharges = Writer::from_path(path)?;
        discharges.write_record(DISCHARGE_HEADER)?;

        let waitlist = if stream_waitlist {
            let wl_dir = dir.join(WAITLIST_DIR);
            fs::create_dir_all(&wl_dir)?;
            let mut w = Writer::from_path(wl_dir.join(format!("{}.csv", waitlist_file_stem(run))))?;
            w.write_record(["epoch", "waitlist_len"])?;
            Some(w)
        } else {
            None
        };

        Ok(Self {
            discharges,
            waitlist,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_discharges(&mut self, rows: &[DischargeRow]) -> OutputResult<()> {
        for row in rows {
            self.discharges.write_record(&[
                row.patient_id.to_string(),
                row.pathway.to_string(),
                row.base_duration.to_string(),
                row.arrival_epoch.to_string(),
                row.first_appt_epoch.map_or_else(String::new, |e| e.to_string()),
                row.n_appts.to_string(),
                row.discharge_epoch.to_string(),
                row.n_ext.to_string(),
                row.sojourn_time.to_string(),
                row.total_wait_time.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_waitlist_sample(&mut self, row: &WaitlistRow) -> OutputResult<()> {
        if let Some(w) = self.waitlist.as_mut() {
            w.write_record(&[row.epoch.to_string(), row.waitlist_len.to_string()])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.discharges.flush()?;
        if let Some(w) = self.waitlist.as_mut() {
            w.flush()?;
        }
        Ok(())
    }
}
