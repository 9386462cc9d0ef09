//! Integration tests for cq-sim.

use cq_core::{CqError, Epoch, SimConfig};
use cq_queue::Intake;
use cq_server::ServiceUnit;

use crate::{EpochSummary, NoopObserver, SimBuilder, SimError, SimObserver, Simulation, generate_servers, run_replications};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three classes, a handful of servers, modest load.
fn test_config(n_epochs: u64) -> SimConfig {
    SimConfig {
        n_epochs,
        seed:            7,
        n_servers:       6,
        max_caseload:    3,
        n_group_servers: vec![2, 0, 2],
        arr_lam:         4.0,
        ..SimConfig::default()
    }
}

/// One class served only by group servers of size 2.
fn group_only_config(n_epochs: u64) -> SimConfig {
    SimConfig {
        n_epochs,
        seed:               11,
        n_servers:          0,
        n_group_servers:    vec![3],
        group_size_props:   vec![0.0, 1.0],
        group_size_effects: vec![0.0, 0.0],
        arr_lam:            2.0,
        arrival_probs:      vec![1.0],
        pathways:           vec![4],
        wait_effects:       vec![0.6],
        modality_effects:   vec![0.0],
        modality_policies:  vec![0.0],
        priority_order:     vec![0],
        max_ax_age:         100.0,
        ..SimConfig::default()
    }
}

fn build(config: SimConfig) -> Simulation {
    SimBuilder::new(config).build().unwrap()
}

/// Records every epoch summary.
#[derive(Default)]
struct Recorder {
    run:       u32,
    starts:    Vec<Epoch>,
    summaries: Vec<EpochSummary>,
    ended:     Option<(Epoch, usize)>,
}

impl SimObserver for Recorder {
    fn on_epoch_start(&mut self, epoch: Epoch) {
        self.starts.push(epoch);
    }

    fn on_epoch_end(&mut self, summary: &EpochSummary) {
        self.summaries.push(*summary);
    }

    fn on_sim_end(&mut self, final_epoch: Epoch, discharged: &cq_queue::DischargeList) {
        self.ended = Some((final_epoch, discharged.n_patients()));
    }
}

/// `(id, discharge epoch)` for every discharged patient, in discharge order.
fn discharge_trace(sim: &Simulation) -> Vec<(u32, Option<Epoch>)> {
    sim.discharged
        .patients()
        .iter()
        .map(|p| (p.id().0, p.discharge_time()))
        .collect()
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let sim = build(SimConfig::default());
        assert_eq!(sim.epoch, Epoch::ZERO);
        assert_eq!(sim.servers().count(), 80);
        assert_eq!(sim.group_servers().count(), 0);
        assert_eq!(sim.n_admitted(), 0);
    }

    #[test]
    fn length_mismatch_surfaces_as_config_error() {
        let config = SimConfig {
            wait_effects: vec![0.6; 2],
            ..SimConfig::default()
        };
        let result = SimBuilder::new(config).build();
        assert!(matches!(
            result,
            Err(SimError::Config(CqError::LengthMismatch { what: "wait_effects", expected: 3, got: 2 }))
        ));
    }

    #[test]
    fn zero_arrival_weights_rejected() {
        let config = SimConfig {
            arrival_probs: vec![0.0; 3],
            ..SimConfig::default()
        };
        assert!(SimBuilder::new(config).build().is_err());
    }

    #[test]
    fn seed_override_replaces_config_seed() {
        let sim = SimBuilder::new(test_config(5)).seed(99).build().unwrap();
        assert_eq!(sim.config.seed, 99);
    }

    #[test]
    fn prefill_waitlists_patients_at_epoch_zero() {
        let config = SimConfig {
            waitlist_prefill: 25,
            ..test_config(5)
        };
        let sim = build(config);
        assert_eq!(sim.n_waitlist(), 25);
        assert_eq!(sim.n_admitted(), 25);
        assert_eq!(sim.n_in_service(), 0);
    }

    #[test]
    fn prefill_override_wins_over_config() {
        let config = SimConfig {
            waitlist_prefill: 25,
            ..test_config(5)
        };
        let sim = SimBuilder::new(config).prefill(3).build().unwrap();
        assert_eq!(sim.n_waitlist(), 3);
    }

    #[test]
    fn supplied_units_used_as_given() {
        let units = vec![ServiceUnit::from(cq_server::Server::new(2, Intake::Any))];
        let sim = SimBuilder::new(test_config(5)).units(units).build().unwrap();
        assert_eq!(sim.units.len(), 1);
        assert_eq!(sim.units[0].max_caseload(), 2);
    }
}

// ── Server population ─────────────────────────────────────────────────────────

#[cfg(test)]
mod population_tests {
    use super::*;

    #[test]
    fn group_counts_follow_size_proportions() {
        let config = SimConfig {
            n_servers:       2,
            n_group_servers: vec![3, 0, 6],
            ..SimConfig::default()
        };
        let units = generate_servers(&config);

        // Default proportions [0, .33, .33, .33]: round(0.99) = 1 and
        // round(1.98) = 2 of each size 2..=4.
        assert_eq!(units.len(), 2 + 3 + 6);
        assert!(!units[0].is_group());
        assert!(!units[1].is_group());
        assert!(units[2..].iter().all(ServiceUnit::is_group));

        let sizes: Vec<(u32, usize)> = units[2..]
            .iter()
            .filter_map(ServiceUnit::as_group)
            .map(|g| (g.class().0, g.max_caseload()))
            .collect();
        assert_eq!(
            sizes,
            vec![(0, 2), (0, 3), (0, 4), (2, 2), (2, 2), (2, 3), (2, 3), (2, 4), (2, 4)]
        );
    }

    #[test]
    fn group_sessions_apply_size_effect() {
        let config = SimConfig {
            n_servers:          0,
            n_group_servers:    vec![0, 2, 0],
            group_size_props:   vec![0.0, 1.0],
            group_size_effects: vec![0.0, -0.3],
            ..SimConfig::default()
        };
        let units = generate_servers(&config);
        assert_eq!(units.len(), 2);
        for g in units.iter().filter_map(ServiceUnit::as_group) {
            // round(10 * 0.7)
            assert_eq!(g.session_count(), 7);
            assert_eq!(g.max_caseload(), 2);
        }
    }

    #[test]
    fn server_classes_give_dedicated_intake() {
        let config = SimConfig {
            n_servers:      3,
            server_classes: vec![2, 0, 2],
            ..SimConfig::default()
        };
        let sim = build(config);
        let intakes: Vec<Intake> = sim.servers().map(|s| s.intake()).collect();
        assert_eq!(
            intakes,
            vec![
                Intake::Class(cq_core::ClassId(2)),
                Intake::Class(cq_core::ClassId(0)),
                Intake::Class(cq_core::ClassId(2)),
            ]
        );
    }

    #[test]
    fn unassigned_servers_share_the_waitlist() {
        let sim = build(test_config(1));
        assert!(sim.servers().all(|s| s.intake() == Intake::Any));
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrival_tests {
    use cq_core::SimRng;

    use super::*;
    use crate::ArrivalGenerator;

    fn age_drawn_at(age_mean: f64) -> f64 {
        let config = SimConfig { age_mean, age_sd: 0.0, ..SimConfig::default() };
        let arrivals = ArrivalGenerator::from_config(&config).unwrap();
        arrivals.draw_age(&mut SimRng::new(1))
    }

    #[test]
    fn young_draws_snap_to_minimum_age() {
        assert_eq!(age_drawn_at(0.4), 0.25);
        assert_eq!(age_drawn_at(0.3), 0.25);
        assert_eq!(age_drawn_at(-1.0), 0.25);
    }

    #[test]
    fn in_range_draws_kept() {
        assert_eq!(age_drawn_at(0.5), 0.5);
        assert_eq!(age_drawn_at(1.7), 1.7);
    }

    #[test]
    fn old_draws_capped() {
        assert_eq!(age_drawn_at(4.0), 2.5);
    }

    #[test]
    fn sampled_ages_never_between_minimum_and_cutoff() {
        let config = SimConfig::default();
        let arrivals = ArrivalGenerator::from_config(&config).unwrap();
        let mut rng = SimRng::new(9);
        for _ in 0..5_000 {
            let age = arrivals.draw_age(&mut rng);
            assert!(age == 0.25 || (0.5..=2.5).contains(&age), "age {age}");
        }
    }

    #[test]
    fn nan_group_effect_fails_build() {
        let config = SimConfig {
            group_size_effects: vec![0.0, f64::NAN],
            ..group_only_config(5)
        };
        assert!(matches!(SimBuilder::new(config).build(), Err(SimError::Config(_))));
    }
}

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_reaches_configured_epoch() {
        let mut sim = build(test_config(20));
        let summary = sim.run(&mut NoopObserver);
        assert_eq!(sim.epoch, Epoch(20));
        assert_eq!(summary.epochs, 20);
        assert_eq!(summary.n_admitted, sim.n_admitted());
    }

    #[test]
    fn observer_sees_every_epoch_once() {
        let mut sim = build(test_config(12));
        let mut rec = Recorder::default();
        sim.run(&mut rec);

        let expected: Vec<Epoch> = (0..12).map(Epoch).collect();
        assert_eq!(rec.starts, expected);
        assert_eq!(rec.summaries.iter().map(|s| s.epoch).collect::<Vec<_>>(), expected);
        assert_eq!(rec.ended, Some((Epoch(12), sim.n_discharged())));
    }

    #[test]
    fn run_epochs_does_not_end_the_run() {
        let mut sim = build(test_config(100));
        let mut rec = Recorder::default();
        sim.run_epochs(5, &mut rec);
        assert_eq!(sim.epoch, Epoch(5));
        assert_eq!(rec.summaries.len(), 5);
        assert!(rec.ended.is_none());
    }

    #[test]
    fn run_continues_from_current_epoch() {
        let mut sim = build(test_config(10));
        sim.run_epochs(4, &mut NoopObserver);
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(rec.starts.first(), Some(&Epoch(4)));
        assert_eq!(rec.starts.len(), 6);
    }

    #[test]
    fn zero_arrival_rate_stays_empty() {
        let config = SimConfig {
            arr_lam: 0.0,
            ..test_config(30)
        };
        let mut sim = build(config);
        let summary = sim.run(&mut NoopObserver);
        assert_eq!(summary.n_admitted, 0);
        assert_eq!(summary.n_discharged, 0);
        assert_eq!(summary.n_waitlist, 0);
        assert_eq!(summary.n_in_service, 0);
    }

    #[test]
    fn summary_arrivals_sum_to_admitted() {
        let config = SimConfig {
            waitlist_prefill: 10,
            ..test_config(40)
        };
        let mut sim = build(config);
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        let arrived: usize = rec.summaries.iter().map(|s| s.arrivals).sum();
        assert_eq!(arrived + 10, sim.n_admitted());
    }

    #[test]
    fn no_servers_means_everyone_waits() {
        let config = SimConfig {
            n_servers:       0,
            n_group_servers: vec![0, 0, 0],
            max_ax_age:      100.0,
            ..test_config(15)
        };
        let mut sim = build(config);
        let summary = sim.run(&mut NoopObserver);
        assert_eq!(summary.n_waitlist, summary.n_admitted);
        assert_eq!(summary.n_discharged, 0);
    }
}

// ── Invariants ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod invariant_tests {
    use super::*;

    #[test]
    fn patients_are_conserved_every_epoch() {
        let config = SimConfig {
            waitlist_prefill: 20,
            ..test_config(0)
        };
        let mut sim = build(config);
        for _ in 0..150 {
            sim.run_epochs(1, &mut NoopObserver);
            assert_eq!(
                sim.n_waitlist() + sim.n_in_service() + sim.n_discharged(),
                sim.n_admitted(),
                "conservation broken at {}",
                sim.epoch
            );
        }
    }

    #[test]
    fn epoch_summary_matches_state() {
        let mut sim = build(test_config(0));
        let mut rec = Recorder::default();
        sim.run_epochs(30, &mut rec);
        let last = rec.summaries.last().unwrap();
        assert_eq!(last.waitlist_len, sim.n_waitlist());
        assert_eq!(last.occupancy, sim.n_in_service());

        let discharged: usize = rec
            .summaries
            .iter()
            .map(|s| s.service.discharged + s.aged_out)
            .sum();
        assert_eq!(discharged, sim.n_discharged());
    }

    #[test]
    fn caseloads_never_exceed_capacity() {
        let config = SimConfig {
            arr_lam: 12.0,
            ..test_config(0)
        };
        let mut sim = build(config);
        for _ in 0..100 {
            sim.run_epochs(1, &mut NoopObserver);
            for unit in &sim.units {
                assert!(unit.n_patients() <= unit.max_caseload());
            }
        }
    }

    #[test]
    fn aged_out_patients_never_served() {
        let config = SimConfig {
            n_servers:       0,
            n_group_servers: vec![0, 0, 0],
            max_ax_age:      2.0,
            ..test_config(80)
        };
        let mut sim = build(config);
        sim.run(&mut NoopObserver);
        assert!(sim.n_discharged() > 0);
        for p in sim.discharged.patients() {
            assert!(p.first_appt().is_none());
            assert_eq!(p.n_appts(), 0);
        }
    }

    #[test]
    fn individual_discharges_are_complete() {
        let config = SimConfig {
            n_group_servers: vec![0, 0, 0],
            max_ax_age:      100.0,
            ..test_config(120)
        };
        let mut sim = build(config);
        sim.run(&mut NoopObserver);
        assert!(sim.n_discharged() > 0);
        for p in sim.discharged.patients() {
            assert!(p.is_complete(), "patient {} discharged early", p.id());
            assert!(p.n_ext() <= cq_patient::MAX_EXTENSIONS);
        }
    }

    #[test]
    fn group_cohorts_discharge_together() {
        let mut sim = build(group_only_config(60));
        sim.run(&mut NoopObserver);
        assert!(sim.n_discharged() > 0);

        // Four sessions: first appointment at f, discharge at f + 3, however
        // many appointments each member actually attended.
        for p in sim.discharged.patients() {
            let first = p.first_appt().unwrap();
            assert_eq!(p.discharge_time(), Some(first.offset(3)));
            assert_eq!(p.n_appts() + p.n_missed(), 4);
        }
    }

    #[test]
    fn active_cohorts_share_one_countdown() {
        let mut sim = build(group_only_config(0));
        for _ in 0..40 {
            sim.run_epochs(1, &mut NoopObserver);
            for g in sim.group_servers() {
                let firsts: Vec<Option<Epoch>> = g.patients().map(|p| p.first_appt()).collect();
                assert!(firsts.windows(2).all(|w| w[0] == w[1]));
            }
        }
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism_tests {
    use super::*;

    #[test]
    fn same_seed_same_run() {
        let mut a = build(test_config(80));
        let mut b = build(test_config(80));
        let sa = a.run(&mut NoopObserver);
        let sb = b.run(&mut NoopObserver);
        assert_eq!(sa, sb);
        assert_eq!(discharge_trace(&a), discharge_trace(&b));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimBuilder::new(test_config(80)).seed(1).build().unwrap();
        let mut b = SimBuilder::new(test_config(80)).seed(2).build().unwrap();
        a.run(&mut NoopObserver);
        b.run(&mut NoopObserver);
        assert_ne!(discharge_trace(&a), discharge_trace(&b));
    }
}

// ── Replications ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod replicate_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn one_result_per_run_in_order() {
        let results = run_replications(&test_config(20), 4, |run| {
            Ok::<_, SimError>(Recorder { run, ..Recorder::default() })
        });
        let results = results.unwrap();
        assert_eq!(results.len(), 4);
        for (i, (summary, rec)) in results.iter().enumerate() {
            assert_eq!(rec.run as usize, i);
            assert_eq!(summary.epochs, 20);
            assert_eq!(rec.summaries.len(), 20);
        }
    }

    #[test]
    fn run_zero_matches_single_simulation() {
        let config = test_config(30);
        let results = run_replications(&config, 2, |_| Ok::<_, SimError>(NoopObserver)).unwrap();

        let mut single = build(config);
        let summary = single.run(&mut NoopObserver);
        assert_eq!(results[0].0, summary);
    }

    #[test]
    fn observer_factory_error_aborts_batch() {
        let result = run_replications(&test_config(5), 3, |run| {
            if run == 1 {
                Err(SimError::Config(CqError::Config("boom".into())))
            } else {
                Ok(NoopObserver)
            }
        });
        assert!(result.is_err());
    }

    /// Counts observers that have been created but whose run has not ended.
    struct Gauge<'a> {
        live: &'a AtomicUsize,
    }

    impl SimObserver for Gauge<'_> {
        fn on_sim_end(&mut self, _: Epoch, _: &cq_queue::DischargeList) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn observers_created_as_runs_start() {
        let live = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let results = run_replications(&test_config(5), 64, |_| {
            let now = live.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            Ok::<_, SimError>(Gauge { live: &live })
        })
        .unwrap();

        #[cfg(not(feature = "parallel"))]
        let workers = 1;
        #[cfg(feature = "parallel")]
        let workers = rayon::current_num_threads();

        assert_eq!(results.len(), 64);
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(
            peak.load(Ordering::SeqCst) <= workers,
            "at most one open run per worker, saw {}",
            peak.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn invalid_config_aborts_before_any_observer() {
        let config = SimConfig {
            arr_lam: -1.0,
            ..test_config(5)
        };
        let created = AtomicUsize::new(0);
        let result = run_replications(&config, 3, |_| {
            created.fetch_add(1, Ordering::SeqCst);
            Ok::<_, SimError>(NoopObserver)
        });
        assert!(result.is_err());
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_config_aborts_batch() {
        let config = SimConfig {
            pathways: vec![],
            ..SimConfig::default()
        };
        let result = run_replications(&config, 2, |_| Ok::<_, SimError>(NoopObserver));
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}
