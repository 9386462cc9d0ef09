//! Parquet output backend (feature `parquet`).
//!
//! Creates, for run `r`, in the configured output directory:
//! - `simulation_data_r.parquet`
//! - `waitlist_data/waitlist_data_r.parquet` (waitlist streaming only)

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{OutputWriter, WAITLIST_DIR, discharge_file_stem, waitlist_file_stem};
use crate::{DischargeRow, OutputResult, WaitlistRow};

fn discharge_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("patient_id",       DataType::UInt32, false),
        Field::new("pathway",          DataType::UInt32, false),
        Field::new("base_duration",    DataType::UInt32, false),
        Field::new("arrival_epoch",    DataType::UInt64, false),
        Field::new("first_appt_epoch", DataType::UInt64, true),
        Field::new("n_appts",          DataType::UInt32, false),
        Field::new("discharge_epoch",  DataType::UInt64, false),
        Field::new("n_ext",            DataType::UInt32, false),
        Field::new("sojourn_time",     DataType::UInt64, false),
        Field::new("total_wait_time",  DataType::UInt64, false),
    ]))
}

fn waitlist_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("epoch",        DataType::UInt64, false),
        Field::new("waitlist_len", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(path: &Path, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(path)?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes one run's output to Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    discharges:  Option<ArrowWriter<File>>,
    waitlist:    Option<ArrowWriter<File>>,
    disc_schema: Arc<Schema>,
    wl_schema:   Arc<Schema>,
}

impl ParquetWriter {
    /// Create run `run`'s files in `dir`.
    pub fn new(dir: &Path, run: u32, stream_waitlist: bool) -> OutputResult<Self> {
        let disc_schema = discharge_schema();
        let wl_schema = waitlist_schema();

        let discharges = open(
            &dir.join(format!("{}.parquet", discharge_file_stem(run))),
            &disc_schema,
        )?;

        let waitlist = if stream_waitlist {
            let wl_dir = dir.join(WAITLIST_DIR);
            fs::create_dir_all(&wl_dir)?;
            Some(open(
                &wl_dir.join(format!("{}.parquet", waitlist_file_stem(run))),
                &wl_schema,
            )?)
        } else {
            None
        };

        Ok(Self {
            discharges: Some(discharges),
            waitlist,
            disc_schema,
            wl_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_discharges(&mut self, rows: &[DischargeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.discharges.as_mut() else {
            return Ok(());
        };

        let mut patient_ids     = UInt32Builder::new();
        let mut pathways        = UInt32Builder::new();
        let mut base_durations  = UInt32Builder::new();
        let mut arrivals        = UInt64Builder::new();
        let mut first_appts     = UInt64Builder::new();
        let mut n_appts         = UInt32Builder::new();
        let mut discharges      = UInt64Builder::new();
        let mut n_exts          = UInt32Builder::new();
        let mut sojourns        = UInt64Builder::new();
        let mut total_waits     = UInt64Builder::new();

        for row in rows {
            patient_ids.append_value(row.patient_id);
            pathways.append_value(row.pathway);
            base_durations.append_value(row.base_duration);
            arrivals.append_value(row.arrival_epoch);
            first_appts.append_option(row.first_appt_epoch);
            n_appts.append_value(row.n_appts);
            discharges.append_value(row.discharge_epoch);
            n_exts.append_value(row.n_ext);
            sojourns.append_value(row.sojourn_time);
            total_waits.append_value(row.total_wait_time);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.disc_schema),
            vec![
                Arc::new(patient_ids.finish()),
                Arc::new(pathways.finish()),
                Arc::new(base_durations.finish()),
                Arc::new(arrivals.finish()),
                Arc::new(first_appts.finish()),
                Arc::new(n_appts.finish()),
                Arc::new(discharges.finish()),
                Arc::new(n_exts.finish()),
                Arc::new(sojourns.finish()),
                Arc::new(total_waits.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_waitlist_sample(&mut self, row: &WaitlistRow) -> OutputResult<()> {
        let Some(writer) = self.waitlist.as_mut() else {
            return Ok(());
        };

        let mut epochs = UInt64Builder::new();
        let mut lens   = UInt64Builder::new();
        epochs.append_value(row.epoch);
        lens.append_value(row.waitlist_len);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.wl_schema),
            vec![Arc::new(epochs.finish()), Arc::new(lens.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.discharges.take() {
            w.close()?;
        }
        if let Some(w) = self.waitlist.take() {
            w.close()?;
        }
        Ok(())
    }
}
