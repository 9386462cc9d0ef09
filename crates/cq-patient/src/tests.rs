//! Unit tests for the patient model.

use cq_core::{ClassId, Epoch, PatientId, SimRng};

use crate::{AttendanceProbs, ClassProfile, Modality, Patient};

fn patient(pathway_len: u32, arrival: u64) -> Patient {
    Patient::new(
        PatientId(0),
        Epoch(arrival),
        1.0,
        &ClassProfile::plain(ClassId(0), pathway_len),
        Modality::InPerson,
        AttendanceProbs::always_attend(),
    )
}

#[cfg(test)]
mod attendance {
    use super::*;
    use crate::Attendance;

    #[test]
    fn always_attend_never_misses() {
        let probs = AttendanceProbs::always_attend();
        let mut rng = SimRng::new(1);
        for _ in 0..1_000 {
            assert_eq!(probs.draw(Modality::Virtual, &mut rng), Attendance::Attended);
            assert_eq!(probs.draw(Modality::InPerson, &mut rng), Attendance::Attended);
        }
    }

    #[test]
    fn zero_weight_outcomes_never_drawn() {
        let probs = AttendanceProbs::new([0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0]);
        let mut rng = SimRng::new(2);
        for _ in 0..500 {
            assert_eq!(probs.draw(Modality::Virtual, &mut rng), Attendance::NoShow);
            assert_eq!(probs.draw(Modality::InPerson, &mut rng), Attendance::PatientCancelled);
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let probs = AttendanceProbs::new([0.9, 0.025, 0.025, 0.05], [0.8, 0.05, 0.05, 0.1]);
        let mut rng = SimRng::new(3);
        let n = 20_000;
        let attended = (0..n)
            .filter(|_| probs.draw(Modality::InPerson, &mut rng).attended())
            .count();
        let rate = attended as f64 / n as f64;
        assert!((rate - 0.8).abs() < 0.02, "attendance rate {rate}");
    }
}

#[cfg(test)]
mod profile {
    use super::*;
    use cq_core::SimConfig;

    #[test]
    fn virtual_scales_required_appts() {
        let p = ClassProfile { modality_effect: 0.5, ..ClassProfile::plain(ClassId(0), 7) };
        assert_eq!(p.required_appts(Modality::InPerson), 7);
        assert_eq!(p.required_appts(Modality::Virtual), 11); // round(10.5)

        let p = ClassProfile { modality_effect: -2.0, ..ClassProfile::plain(ClassId(0), 7) };
        assert_eq!(p.required_appts(Modality::Virtual), 0);
    }

    #[test]
    fn modality_policy_extremes() {
        let mut rng = SimRng::new(4);
        let never = ClassProfile::plain(ClassId(0), 5);
        let always = ClassProfile { modality_policy: 1.0, ..never.clone() };
        for _ in 0..100 {
            assert_eq!(never.draw_modality(&mut rng), Modality::InPerson);
            assert_eq!(always.draw_modality(&mut rng), Modality::Virtual);
        }
    }

    #[test]
    fn profiles_read_from_config() {
        let cfg = SimConfig::default();
        let profiles = ClassProfile::all_from_config(&cfg).unwrap();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[2].class, ClassId(2));
        assert_eq!(profiles[2].pathway_len, 13);
        assert_eq!(profiles[2].modality_policy, 1.0);
        assert!(ClassProfile::from_config(&cfg, ClassId(9)).is_err());
    }
}

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn completes_after_pathway_len_appointments() {
        let mut p = patient(3, 0);
        let mut rng = SimRng::new(5);
        for e in 0..3 {
            assert!(!p.is_complete());
            let out = p.process_patient(Epoch(e), &mut rng);
            assert!(out.attended);
            assert!(!out.extended);
        }
        assert!(p.is_complete());
        assert_eq!(p.n_appts(), 3);
        assert_eq!(p.first_appt(), Some(Epoch(0)));
    }

    #[test]
    fn zero_length_pathway_is_complete_immediately() {
        let p = patient(0, 0);
        assert!(p.is_complete());
    }

    #[test]
    fn missed_appointments_add_wait() {
        let profile = ClassProfile::plain(ClassId(1), 2);
        let mut p = Patient::new(
            PatientId(9),
            Epoch(2),
            1.0,
            &profile,
            Modality::InPerson,
            AttendanceProbs::new([1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]),
        );
        let mut rng = SimRng::new(6);
        for e in 5..8 {
            let out = p.process_patient(Epoch(e), &mut rng);
            assert!(!out.attended);
        }
        assert!(!p.is_complete());
        assert_eq!(p.n_missed(), 3);
        p.set_discharge_time(Epoch(8));
        assert_eq!(p.waitlist_wait(), Some(3));
        assert_eq!(p.total_wait_time(), Some(6));
        assert_eq!(p.sojourn_time(), Some(6));
    }

    #[test]
    fn no_wait_means_no_extension() {
        let profile = ClassProfile { wait_effect: 1.0, ..ClassProfile::plain(ClassId(0), 4) };
        let mut p = Patient::new(
            PatientId(0), Epoch(3), 1.0, &profile, Modality::InPerson,
            AttendanceProbs::always_attend(),
        );
        let mut rng = SimRng::new(7);
        p.process_patient(Epoch(3), &mut rng);
        assert_eq!(p.extension_probability(), 0.0);
        for e in 4..6 {
            p.process_patient(Epoch(e), &mut rng);
        }
        let out = p.process_patient(Epoch(6), &mut rng);
        assert!(!out.extended);
        assert!(p.is_complete());
    }

    #[test]
    fn extensions_raise_requirement_and_are_capped() {
        // wait_effect large enough that p clamps to 1.0 after a long wait.
        let profile = ClassProfile { wait_effect: 100.0, ..ClassProfile::plain(ClassId(0), 2) };
        let mut p = Patient::new(
            PatientId(0), Epoch(0), 1.0, &profile, Modality::InPerson,
            AttendanceProbs::always_attend(),
        );
        let mut rng = SimRng::new(8);
        let mut epoch = 50;
        while !p.is_complete() {
            p.process_patient(Epoch(epoch), &mut rng);
            epoch += 1;
        }
        assert_eq!(p.n_ext(), crate::MAX_EXTENSIONS);
        assert_eq!(p.required_appts(), 2 + crate::MAX_EXTENSIONS * p.extension_len());
        assert_eq!(p.n_appts(), p.required_appts());
    }

    #[test]
    fn ages_while_waiting() {
        let p = patient(3, 0);
        assert!((p.age_at(Epoch(52), 52) - 2.0).abs() < 1e-9);
    }
}
