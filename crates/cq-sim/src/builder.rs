//! Fluent builder for constructing a [`Simulation`].

use cq_core::{ClassId, Epoch, SimConfig, SimRng};
use cq_queue::{DischargeList, Intake, Waitlist};
use cq_server::{GroupServer, Server, ServiceUnit};
use tracing::info;

use crate::{ArrivalGenerator, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                      |
/// |---------------|----------------------------------------------|
/// | `.seed(s)`    | `config.seed`                                |
/// | `.units(v)`   | `generate_servers(&config)`                  |
/// | `.prefill(n)` | `config.waitlist_prefill`                    |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .seed(7)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:  SimConfig,
    seed:    Option<u64>,
    units:   Option<Vec<ServiceUnit>>,
    prefill: Option<usize>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            seed:    None,
            units:   None,
            prefill: None,
        }
    }

    /// Override the RNG seed without touching the rest of the config.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Supply the service units directly instead of generating them from the
    /// config.  Units advance in the order given.
    pub fn units(mut self, units: Vec<ServiceUnit>) -> Self {
        self.units = Some(units);
        self
    }

    /// Override the number of patients placed on the waitlist before epoch 0.
    pub fn prefill(mut self, n: usize) -> Self {
        self.prefill = Some(n);
        self
    }

    /// Validate the config, build the server population and arrival
    /// distributions, prefill the waitlist, and return a ready-to-run
    /// [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        let mut config = self.config;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;

        let units = match self.units {
            Some(u) => u,
            None => generate_servers(&config),
        };
        let n_groups = units.iter().filter(|u| u.is_group()).count();
        info!(
            servers       = units.len() - n_groups,
            group_servers = n_groups,
            classes       = config.n_classes(),
            "service units ready"
        );

        let prefill = self.prefill.unwrap_or(config.waitlist_prefill);
        let mut sim = Simulation {
            epoch:      Epoch::ZERO,
            waitlist:   Waitlist::from_config(&config),
            discharged: DischargeList::new(),
            arrivals:   ArrivalGenerator::from_config(&config)?,
            rng:        SimRng::new(config.seed),
            units,
            config,
            n_admitted: 0,
        };

        if prefill > 0 {
            sim.prefill_waitlist(prefill);
            info!(patients = prefill, "waitlist prefilled");
        }
        Ok(sim)
    }
}

/// Build the configured server population: every individual server first,
/// then, per class, the group servers of each size.
///
/// Class `i` gets `round(n_group_servers[i] · group_size_props[j])` group
/// servers of size `j + 1`, each using session modifier
/// `group_size_effects[j]`.
pub fn generate_servers(config: &SimConfig) -> Vec<ServiceUnit> {
    let mut units: Vec<ServiceUnit> = (0..config.n_servers)
        .map(|i| {
            let intake = config
                .server_classes
                .get(i)
                .map_or(Intake::Any, |&c| Intake::Class(ClassId(c)));
            Server::new(config.max_caseload, intake).into()
        })
        .collect();

    for (class, (&n_groups, &path_len)) in config
        .n_group_servers
        .iter()
        .zip(&config.pathways)
        .enumerate()
    {
        for (j, (&prop, &effect)) in config
            .group_size_props
            .iter()
            .zip(&config.group_size_effects)
            .enumerate()
        {
            let count = (n_groups as f64 * prop).round() as usize;
            for _ in 0..count {
                units.push(GroupServer::new(ClassId(class as u32), path_len, j + 1, effect).into());
            }
        }
    }
    units
}
