//! SQLite output backend (feature `sqlite`).
//!
//! Creates one `simulation_r.db` per run `r` with two tables: `discharges`
//! and `waitlist`.  The `waitlist` table stays empty unless waitlist
//! streaming is enabled.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{DischargeRow, OutputResult, WaitlistRow};

/// Writes one run's output to an SQLite database.
pub struct SqliteWriter {
    conn:            Connection,
    stream_waitlist: bool,
    finished:        bool,
}

impl SqliteWriter {
    /// Open (or create) `simulation_{run}.db` in `dir` and initialise the
    /// schema.
    pub fn new(dir: &Path, run: u32, stream_waitlist: bool) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(format!("simulation_{run}.db")))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS discharges (
                 patient_id       INTEGER PRIMARY KEY,
                 pathway          INTEGER NOT NULL,
                 base_duration    INTEGER NOT NULL,
                 arrival_epoch    INTEGER NOT NULL,
                 first_appt_epoch INTEGER,
                 n_appts          INTEGER NOT NULL,
                 discharge_epoch  INTEGER NOT NULL,
                 n_ext            INTEGER NOT NULL,
                 sojourn_time     INTEGER NOT NULL,
                 total_wait_time  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS waitlist (
                 epoch        INTEGER PRIMARY KEY,
                 waitlist_len INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, stream_waitlist, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_discharges(&mut self, rows: &[DischargeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO discharges \
                 (patient_id, pathway, base_duration, arrival_epoch, first_appt_epoch, \
                  n_appts, discharge_epoch, n_ext, sojourn_time, total_wait_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.patient_id,
                    row.pathway,
                    row.base_duration,
                    row.arrival_epoch as i64,
                    row.first_appt_epoch.map(|e| e as i64),
                    row.n_appts,
                    row.discharge_epoch as i64,
                    row.n_ext,
                    row.sojourn_time as i64,
                    row.total_wait_time as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_waitlist_sample(&mut self, row: &WaitlistRow) -> OutputResult<()> {
        if !self.stream_waitlist {
            return Ok(());
        }
        self.conn.execute(
            "INSERT INTO waitlist (epoch, waitlist_len) VALUES (?1, ?2)",
            rusqlite::params![row.epoch as i64, row.waitlist_len as i64],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
