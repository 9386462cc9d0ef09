//! Command-line options and their mapping onto [`SimConfig`].

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use cq_core::{AttendanceRow, SimConfig};

/// Output backend for per-run files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Parquet,
    Sqlite,
}

/// Every option left unset keeps the value from `--config` (or the built-in
/// default when no config file is given).
#[derive(Parser, Debug)]
#[command(name = "caseflow")]
#[command(about = "Discrete-epoch simulation of a waitlist feeding individual and group services")]
#[command(version)]
pub struct Args {
    /// JSON file with a full or partial configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of epochs per run
    #[arg(long)]
    pub n_epochs: Option<u64>,

    /// Patients placed on the waitlist before epoch 0
    #[arg(long)]
    pub waitlist_prefill: Option<usize>,

    /// Number of individual servers
    #[arg(long)]
    pub servers: Option<usize>,

    /// Target utilization; sizes the individual servers and overrides --servers
    #[arg(long)]
    pub utilization: Option<f64>,

    /// Group servers per class (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub n_group_servers: Option<Vec<u32>>,

    /// Share of group servers with size 1, 2, ... (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub group_size_props: Option<Vec<f64>>,

    /// Session-count modifier for group size 1, 2, ... (comma-separated)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub group_size_effects: Option<Vec<f64>>,

    /// Caseload capacity of every individual server
    #[arg(long)]
    pub max_caseload: Option<usize>,

    /// Mean arrivals per epoch
    #[arg(long)]
    pub arr_lam: Option<f64>,

    /// Output directory
    #[arg(long, default_value = "output")]
    pub folder: PathBuf,

    /// Pathway length per class (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub pathways: Option<Vec<u32>>,

    /// Waiting-time extension effect per class (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub wait_effects: Option<Vec<f64>>,

    /// Virtual-delivery effect on pathway length per class (comma-separated)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub modality_effects: Option<Vec<f64>>,

    /// Probability of virtual delivery per class (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub modality_policies: Option<Vec<f64>>,

    /// Age (years) past which waiting patients leave the waitlist
    #[arg(long)]
    pub max_ax_age: Option<f64>,

    /// Arrival age distribution as `mean,sd`
    #[arg(long, value_delimiter = ',')]
    pub age_params: Option<Vec<f64>>,

    /// Class order used by shared servers (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub priority_order: Option<Vec<u32>>,

    /// Whether shared servers follow --priority-order
    #[arg(long)]
    pub priority_wlist: Option<bool>,

    /// Relative arrival weight per class (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub arrival_probs: Option<Vec<f64>>,

    /// Number of independent runs
    #[arg(long, default_value_t = 1)]
    pub runs: u32,

    /// Write the waitlist length after every epoch
    #[arg(long)]
    pub waitlist_log: bool,

    /// Virtual outcome weights: attended, patient cancel, clinician cancel, no-show
    #[arg(long, value_delimiter = ',')]
    pub virtual_att_probs: Option<Vec<f64>>,

    /// In-person outcome weights: attended, patient cancel, clinician cancel, no-show
    #[arg(long, value_delimiter = ',')]
    pub face_att_probs: Option<Vec<f64>>,

    /// Base RNG seed; run `r` derives its own seed from it
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Worker threads for concurrent runs (default: all cores)
    #[arg(long)]
    pub jobs: Option<usize>,
}

impl Args {
    /// Start from `--config` (or the defaults) and apply every option given
    /// on the command line.
    pub fn to_config(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str::<SimConfig>(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SimConfig::default(),
        };

        set(&mut config.n_epochs, self.n_epochs);
        set(&mut config.waitlist_prefill, self.waitlist_prefill);
        set(&mut config.n_servers, self.servers);
        set(&mut config.max_caseload, self.max_caseload);
        set(&mut config.arr_lam, self.arr_lam);
        set(&mut config.max_ax_age, self.max_ax_age);
        set(&mut config.priority_wlist, self.priority_wlist);
        set(&mut config.seed, self.seed);
        set(&mut config.n_group_servers, self.n_group_servers.clone());
        set(&mut config.group_size_props, self.group_size_props.clone());
        set(&mut config.group_size_effects, self.group_size_effects.clone());
        set(&mut config.pathways, self.pathways.clone());
        set(&mut config.wait_effects, self.wait_effects.clone());
        set(&mut config.modality_effects, self.modality_effects.clone());
        set(&mut config.modality_policies, self.modality_policies.clone());
        set(&mut config.priority_order, self.priority_order.clone());
        set(&mut config.arrival_probs, self.arrival_probs.clone());
        if self.waitlist_log {
            config.waitlist_logging = true;
        }

        if let Some(params) = &self.age_params {
            let [mean, sd] = params.as_slice() else {
                bail!("--age-params takes exactly two values (mean,sd), got {}", params.len());
            };
            config.age_mean = *mean;
            config.age_sd = *sd;
        }
        if let Some(row) = &self.virtual_att_probs {
            config.virtual_att_probs = attendance_row("--virtual-att-probs", row)?;
        }
        if let Some(row) = &self.face_att_probs {
            config.face_att_probs = attendance_row("--face-att-probs", row)?;
        }

        if let Some(u) = self.utilization {
            config.n_servers = config.servers_for_utilization(u)?;
        }
        Ok(config)
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn attendance_row(flag: &str, values: &[f64]) -> anyhow::Result<AttendanceRow> {
    AttendanceRow::try_from(values)
        .with_context(|| format!("{flag} takes exactly four values, got {}", values.len()))
}
