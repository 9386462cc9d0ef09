//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use cq_core::Epoch;
use cq_queue::DischargeList;
use cq_sim::{EpochSummary, SimObserver};
use tracing::debug;

use crate::row::{DischargeRow, WaitlistRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that streams waitlist samples and exports the discharge
/// list to any [`OutputWriter`] backend (CSV, SQLite, Parquet).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
///
/// The writer is finished and dropped at the end of the run, closing its
/// files; later hooks are no-ops.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:          Option<W>,
    stream_waitlist: bool,
    last_error:      Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.  Waitlist length is written
    /// after every epoch when `stream_waitlist` is set.
    pub fn new(writer: W, stream_waitlist: bool) -> Self {
        Self {
            writer: Some(writer),
            stream_waitlist,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_epoch_end(&mut self, summary: &EpochSummary) {
        if !self.stream_waitlist {
            return;
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let row = WaitlistRow {
            epoch:        summary.epoch.0,
            waitlist_len: summary.waitlist_len as u64,
        };
        let result = writer.write_waitlist_sample(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, final_epoch: Epoch, discharged: &DischargeList) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        let rows: Vec<DischargeRow> = discharged
            .patients()
            .iter()
            .filter_map(DischargeRow::from_patient)
            .collect();
        debug!(rows = rows.len(), %final_epoch, "exporting discharges");

        let result = writer.write_discharges(&rows);
        self.store_err(result);
        let result = writer.finish();
        self.store_err(result);
    }
}
