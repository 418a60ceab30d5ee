#![cfg(test)]

use core::f64::consts::{PI, TAU};

use glam::DVec3;
use hifitime::{Duration, Epoch, HifitimeError};

use crate::{
    body_presets, julian_day_number, solve_eccentric_anomaly, true_anomaly_from_eccentric,
    wrap_angle, Body, BodyAddError, CalendarDate, ConicParameter, DateError, ElementsError,
    EpochPrecision, Orbit, OrbitTrait, OrbitalElementSet, PropagationError, PropagationPhase,
    Projector, ResolvedElements, SecularRates, SimulationClock, SimulationConfig, Universe,
    DAYS_PER_JULIAN_CENTURY, J2000_JDN, KEPLER_TOLERANCE, KM_PER_AU, ORBIT_PATH_STEP,
};

const ORBIT_POLL_ANGLES: usize = 4096;
const RANDOM_CASES: usize = 2048;


use assertions::*;
use polling::*;
use seeders::*;

/// Positions in AU, so tolerances read as astronomical distances.
fn au_config() -> SimulationConfig {
    SimulationConfig {
        distance_scale: KM_PER_AU,
        ..Default::default()
    }
}

fn anchored_random_orbit(config: &SimulationConfig) -> Orbit {
    let elements = random_any();
    let epoch = elements.get_reference_epoch() + rand::random_range(-1000.0..1000.0);

    let mut orbit = Orbit::with_config(elements, config);
    orbit.anchor_at_epoch(epoch).unwrap();
    orbit
}

fn keplers_residual(eccentric_anomaly: f64, eccentricity: f64, mean_anomaly: f64) -> f64 {
    (eccentric_anomaly - eccentricity * eccentric_anomaly.sin() - mean_anomaly).abs()
}

#[test]
fn test_kepler_converges_everywhere() {
    for _ in 0..(RANDOM_CASES * 32) {
        let mean_anomaly = rand::random_range(-20.0..20.0);
        let eccentricity = rand::random_range(0.0..0.99);

        let eccentric_anomaly = solve_eccentric_anomaly(mean_anomaly, eccentricity)
            .unwrap_or_else(|e| panic!("{e}"));

        assert!(
            keplers_residual(eccentric_anomaly, eccentricity, mean_anomaly) < KEPLER_TOLERANCE,
            "M = {mean_anomaly}, e = {eccentricity}, E = {eccentric_anomaly}"
        );
    }
}

#[test]
fn test_kepler_near_parabolic() {
    let eccentricities = [0.99, 0.995, 0.999, 0.9999];

    for eccentricity in eccentricities {
        for i in 0..ORBIT_POLL_ANGLES {
            let mean_anomaly = (i as f64) * TAU / (ORBIT_POLL_ANGLES as f64);
            let eccentric_anomaly = solve_eccentric_anomaly(mean_anomaly, eccentricity)
                .unwrap_or_else(|e| panic!("{e}"));

            assert!(
                keplers_residual(eccentric_anomaly, eccentricity, mean_anomaly)
                    < KEPLER_TOLERANCE,
                "M = {mean_anomaly}, e = {eccentricity}"
            );
        }
    }
}

#[test]
fn test_kepler_circular_is_identity() {
    for _ in 0..RANDOM_CASES {
        let mean_anomaly = rand::random_range(0.0..TAU);
        assert_eq!(solve_eccentric_anomaly(mean_anomaly, 0.0), Ok(mean_anomaly));
    }
}

#[test]
fn test_kepler_non_finite() {
    let error = solve_eccentric_anomaly(f64::NAN, 0.5).unwrap_err();
    assert_eq!(error.iterations, 0);
    assert!(error.residual.is_nan());

    assert!(solve_eccentric_anomaly(f64::INFINITY, 0.5).is_err());
}

#[test]
fn test_true_anomaly_conversion() {
    let known = [
        ("periapsis", 0.0, 0.3, 0.0),
        ("circular", 1.0, 0.0, 1.0),
        ("circular, past apoapsis", 4.0, 0.0, 4.0 - TAU),
    ];

    for (what, eccentric_anomaly, eccentricity, expected) in known {
        assert_almost_eq(
            true_anomaly_from_eccentric(eccentric_anomaly, eccentricity),
            expected,
            what,
        );
    }

    assert_almost_eq(
        true_anomaly_from_eccentric(PI, 0.7).abs(),
        PI,
        "apoapsis",
    );
}

#[test]
fn test_true_anomaly_is_normalised() {
    for _ in 0..RANDOM_CASES {
        let elements = random_any();
        let mean_anomaly = rand::random_range(0.0..TAU);
        let true_anomaly = elements
            .get_true_anomaly_at_mean_anomaly(mean_anomaly)
            .unwrap();

        assert!(
            (0.0..=TAU).contains(&true_anomaly),
            "true anomaly {true_anomaly} for M = {mean_anomaly}"
        );
    }
}

#[test]
fn test_wrap_angle() {
    let known = [
        ("zero", 0.0, 0.0),
        ("full turn", TAU, 0.0),
        ("two turns", 2.0 * TAU, 0.0),
        ("tiny negative", -1e-20, 0.0),
        ("in range", 3.0, 3.0),
    ];

    for (what, angle, expected) in known {
        assert_eq!(wrap_angle(angle), expected, "{what}");
    }

    for _ in 0..RANDOM_CASES {
        let angle = rand::random_range(-1e6..1e6);
        let wrapped = wrap_angle(angle);

        assert!((0.0..TAU).contains(&wrapped), "{angle} wrapped to {wrapped}");
        assert_almost_eq_within(
            wrapped.sin(),
            angle.sin(),
            1e-9,
            &format!("sine of {angle}"),
        );
    }
}

#[test]
fn test_elements_validation() {
    let rates = SecularRates::default();
    let cases = [
        (
            "hyperbolic",
            OrbitalElementSet::new(1.0, 1.2, 0.0, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates),
            Some(ElementsError::EccentricityOutOfRange(1.2)),
        ),
        (
            "parabolic",
            OrbitalElementSet::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates),
            Some(ElementsError::EccentricityOutOfRange(1.0)),
        ),
        (
            "negative eccentricity",
            OrbitalElementSet::new(1.0, -0.1, 0.0, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates),
            Some(ElementsError::EccentricityOutOfRange(-0.1)),
        ),
        (
            "zero period",
            OrbitalElementSet::new(1.0, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, J2000_JDN, rates),
            Some(ElementsError::NonPositivePeriod(0.0)),
        ),
        (
            "negative axis",
            OrbitalElementSet::new(-1.0, 0.1, 0.0, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates),
            Some(ElementsError::NonPositiveSemiMajorAxis(-1.0)),
        ),
        (
            "circular",
            OrbitalElementSet::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates),
            None,
        ),
    ];

    for (what, result, expected) in cases {
        assert_eq!(result.err(), expected, "{what}");
    }

    let result = OrbitalElementSet::new(1.0, 0.1, f64::NAN, 0.0, 0.0, 0.0, 1.0, J2000_JDN, rates);
    assert!(
        matches!(
            result,
            Err(ElementsError::NonFinite {
                field: "inclination",
                ..
            })
        ),
        "{result:?}"
    );
}

#[test]
fn test_degrees_converted_on_construction() {
    let elements = OrbitalElementSet::from_degrees(
        1.0,
        0.1,
        90.0,
        180.0,
        45.0,
        0.5,
        1.0,
        J2000_JDN,
        SecularRates {
            inclination: 1.0,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(elements.get_inclination(), 90.0_f64.to_radians());
    assert_eq!(elements.get_long_of_periapsis(), 180.0_f64.to_radians());
    assert_eq!(elements.get_long_asc_node(), 45.0_f64.to_radians());
    assert_eq!(elements.get_mean_anomaly_at_epoch(), 0.5);
    assert_eq!(
        elements.get_secular_rates().inclination,
        1.0_f64.to_radians()
    );
    assert_almost_eq(elements.get_arg_pe(), 135.0_f64.to_radians(), "argument of periapsis");
}

#[test]
fn test_secular_resolution_after_one_century() {
    for _ in 0..RANDOM_CASES {
        let elements = random_any();
        let rates = elements.get_secular_rates();
        let resolved = elements.resolve_centuries(1.0);

        assert_eq!(
            resolved.semi_major_axis,
            elements.get_semi_major_axis() + rates.semi_major_axis
        );
        assert_eq!(
            resolved.eccentricity,
            elements.get_eccentricity() + rates.eccentricity
        );
        assert_eq!(
            resolved.inclination,
            elements.get_inclination() + rates.inclination
        );
        assert_eq!(
            resolved.long_of_periapsis,
            elements.get_long_of_periapsis() + rates.long_of_periapsis
        );
        assert_eq!(
            resolved.long_asc_node,
            elements.get_long_asc_node() + rates.long_asc_node
        );

        let by_epoch = elements.resolve(elements.get_reference_epoch() + DAYS_PER_JULIAN_CENTURY);
        assert_almost_eq_within(
            by_epoch.eccentricity,
            resolved.eccentricity,
            1e-12,
            "eccentricity resolved by epoch",
        );
    }
}

#[test]
fn test_resolution_at_reference_epoch() {
    for _ in 0..RANDOM_CASES {
        let elements = random_any();
        assert_eq!(
            elements.resolve(elements.get_reference_epoch()),
            elements.at_reference_epoch()
        );
    }
}

#[test]
fn test_semi_latus_rectum() {
    let elliptic = ResolvedElements {
        semi_major_axis: 2.0,
        eccentricity: 0.5,
        inclination: 0.0,
        long_of_periapsis: 0.0,
        long_asc_node: 0.0,
    };
    let circular = ResolvedElements {
        eccentricity: 0.0,
        ..elliptic
    };

    let orbits = [
        ("elliptic legacy", elliptic, ConicParameter::Legacy, 0.5),
        ("elliptic exact", elliptic, ConicParameter::Exact, 1.5),
        ("circular legacy", circular, ConicParameter::Legacy, 2.0),
        ("circular exact", circular, ConicParameter::Exact, 2.0),
    ];

    for (what, orbit, conic, expected) in orbits {
        assert_almost_eq(orbit.get_semi_latus_rectum(conic), expected, what);
    }
}

#[test]
fn test_exact_apsides() {
    for _ in 0..RANDOM_CASES {
        let elements = random_any();

        assert_almost_eq(
            elements.get_altitude_at_true_anomaly(0.0, ConicParameter::Exact),
            elements.get_periapsis(),
            "periapsis",
        );
        assert_almost_eq(
            elements.get_altitude_at_true_anomaly(PI, ConicParameter::Exact),
            elements.get_apoapsis(),
            "apoapsis",
        );
    }
}

#[test]
fn test_legacy_conic_is_scaled_exact() {
    for _ in 0..RANDOM_CASES {
        let elements = random_elliptic();
        let eccentricity = elements.get_eccentricity();
        let true_anomaly = rand::random_range(0.0..TAU);

        let legacy = elements.get_position_at_true_anomaly(true_anomaly, ConicParameter::Legacy);
        let exact = elements.get_position_at_true_anomaly(true_anomaly, ConicParameter::Exact);

        assert_relative_eq(
            legacy.length() / exact.length(),
            (1.0 - eccentricity) / (1.0 + eccentricity),
            1e-9,
            "legacy to exact ratio",
        );
        assert_almost_eq_within(
            legacy.normalize().dot(exact.normalize()),
            1.0,
            1e-9,
            "direction",
        );
    }
}

#[test]
fn test_circular_radius() {
    for _ in 0..(RANDOM_CASES / 16) {
        let elements = random_circular();
        let semi_major_axis = elements.get_semi_major_axis();

        for conic in [ConicParameter::Legacy, ConicParameter::Exact] {
            for altitude in poll_altitude(&elements, conic) {
                assert_eq!(altitude, semi_major_axis);
            }
            for position in poll_orbit(&elements, conic) {
                assert_almost_eq_within(
                    position.length(),
                    semi_major_axis,
                    semi_major_axis * 1e-12,
                    "circular radius",
                );
            }
        }
    }
}

#[test]
fn test_planar_orbits_stay_in_ecliptic() {
    for _ in 0..(RANDOM_CASES / 16) {
        let elements = random_planar();

        for position in poll_orbit(&elements, ConicParameter::Exact) {
            assert_eq!(position.y, 0.0, "{position:?} for {elements:?}");
        }
    }
}

#[test]
fn test_inclined_orbit_leaves_ecliptic() {
    let elements = ResolvedElements {
        semi_major_axis: 1.0,
        eccentricity: 0.0,
        inclination: PI / 2.0,
        long_of_periapsis: 0.0,
        long_asc_node: 0.0,
    };

    let position = elements.get_position_at_true_anomaly(PI / 2.0, ConicParameter::Exact);
    assert_almost_eq_vec3_within(
        position,
        DVec3::new(0.0, 1.0, 0.0),
        1e-12,
        "quarter turn over a polar orbit",
    );

    let position = elements.get_position_at_true_anomaly(0.0, ConicParameter::Exact);
    assert_almost_eq_vec3_within(position, DVec3::X, 1e-12, "ascending node");
}

#[test]
fn test_earth_periapsis_distance() {
    let elements = body_presets::planets::earth_elements();
    let projector = Projector::new(1.0, ConicParameter::Exact);

    let position = projector.project(&elements, 0.0);
    let expected =
        elements.get_semi_major_axis() * (1.0 - elements.get_eccentricity()) * KM_PER_AU;

    assert_relative_eq(position.length(), expected, 1e-6, "Earth periapsis in km");
}

#[test]
fn test_projector_scale() {
    let elements = random_elliptic();
    let true_anomaly = rand::random_range(0.0..TAU);

    let in_km = Projector::new(1.0, ConicParameter::Exact).project(&elements, true_anomaly);
    let in_au = Projector::new(KM_PER_AU, ConicParameter::Exact).project(&elements, true_anomaly);
    let unscaled = elements.get_position_at_true_anomaly(true_anomaly, ConicParameter::Exact);

    assert_almost_eq_vec3_within(in_au, unscaled, 1e-12, "AU projection");
    assert_almost_eq_vec3_within(in_km / KM_PER_AU, unscaled, 1e-12, "km projection");
}

#[test]
fn test_sample_path() {
    let elements = random_elliptic();
    let projector = Projector::new(KM_PER_AU, ConicParameter::Legacy);
    let path = projector.sample_path(&elements);

    assert_eq!(path.len(), 2274);
    assert_eq_vec3(path[0], projector.project(&elements, 0.0), "first point");
    assert_eq_vec3(
        path[1],
        projector.project(&elements, ORBIT_PATH_STEP),
        "second point",
    );

    // The path runs past a full turn, so its end overlaps its start.
    let closing = path
        .iter()
        .skip(2000)
        .map(|point| point.distance(path[0]))
        .fold(f64::INFINITY, f64::min);
    assert!(closing < 0.01 * elements.get_apoapsis(), "closing gap {closing}");
}

mod propagation {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut orbit = Orbit::new(random_any());
        assert_eq!(orbit.get_phase(), PropagationPhase::Uninitialized);

        assert_eq!(orbit.advance(1.0, 1.0), Err(PropagationError::NotAnchored));
        assert_eq!(orbit.from_mean_anomaly(1.0), Err(PropagationError::NotAnchored));
        assert_eq!(orbit.get_phase(), PropagationPhase::Uninitialized);

        orbit
            .anchor_at_epoch(orbit.get_elements().get_reference_epoch())
            .unwrap();
        assert_eq!(orbit.get_phase(), PropagationPhase::Anchored);

        orbit.advance(1.0, 1.0).unwrap();
        assert_eq!(orbit.get_phase(), PropagationPhase::Advancing);

        orbit
            .set_from_date(&CalendarDate::new(2010, 6, 1))
            .unwrap();
        assert_eq!(orbit.get_phase(), PropagationPhase::Anchored);
    }

    #[test]
    fn test_anchor_mean_anomaly() {
        for _ in 0..RANDOM_CASES {
            let elements = random_any();
            let reference = elements.get_reference_epoch();
            let epoch = reference + rand::random_range(-1000.0..1000.0);

            let mut orbit = Orbit::new(elements);
            orbit.anchor_at_epoch(epoch).unwrap();

            let expected = wrap_angle(
                elements.get_mean_anomaly_at_epoch() + elements.get_mean_motion() * (epoch - reference),
            );
            assert_eq!(orbit.get_mean_anomaly().to_bits(), expected.to_bits());
            assert_eq!(
                orbit.get_mean_motion().to_bits(),
                elements.get_mean_motion().to_bits()
            );
            assert_anomalies_wrapped(&orbit, "anchored orbit");
        }
    }

    #[test]
    fn test_anchor_then_zero_advance() {
        let config = au_config();

        for _ in 0..RANDOM_CASES {
            let mut orbit = anchored_random_orbit(&config);
            let anchored = *orbit.get_state();

            let position = orbit
                .advance(0.0, rand::random_range(-10.0..10.0))
                .unwrap();

            assert_eq_vec3(position, anchored.position, "zero advance");
            assert_eq_state(orbit.get_state(), &anchored, "zero advance");
        }
    }

    #[test]
    fn test_from_mean_anomaly_is_idempotent() {
        let config = au_config();

        for _ in 0..RANDOM_CASES {
            let mut orbit = anchored_random_orbit(&config);
            let mean_anomaly = rand::random_range(-TAU..(2.0 * TAU));

            let first = orbit.from_mean_anomaly(mean_anomaly).unwrap();
            let first_state = *orbit.get_state();
            let second = orbit.from_mean_anomaly(mean_anomaly).unwrap();

            assert_eq_vec3(first, second, "repeated placement");
            assert_eq_state(&first_state, orbit.get_state(), "repeated placement");
        }
    }

    #[test]
    fn test_full_revolution_is_periodic() {
        let config = au_config();

        for _ in 0..RANDOM_CASES {
            let mut orbit = anchored_random_orbit(&config);
            let start = orbit.get_position();
            let steps = rand::random_range(1..=64_u32);
            let delta = TAU / f64::from(steps) / orbit.get_mean_motion();

            for _ in 0..steps {
                orbit.advance(delta, 1.0).unwrap();
                assert_anomalies_wrapped(&orbit, "advancing orbit");
            }

            assert_almost_eq_vec3_within(
                orbit.get_position(),
                start,
                1e-9,
                &format!("after one revolution in {steps} steps"),
            );
        }
    }

    #[test]
    fn test_advance_wraps_both_ways() {
        let config = au_config();
        let mut orbit = anchored_random_orbit(&config);

        for _ in 0..RANDOM_CASES {
            let delta = rand::random_range(-1e4..1e4);
            let days_per_second = rand::random_range(-5.0..5.0);

            orbit.advance(delta, days_per_second).unwrap();
            assert_anomalies_wrapped(&orbit, "random walk");
        }
    }

    #[test]
    fn test_reverse_time_retraces() {
        let config = au_config();

        for _ in 0..RANDOM_CASES {
            let mut orbit = anchored_random_orbit(&config);
            let start = orbit.get_position();
            let delta = rand::random_range(0.0..100.0);

            orbit.advance(delta, 1.0).unwrap();
            orbit.advance(delta, -1.0).unwrap();

            assert_almost_eq_vec3_within(orbit.get_position(), start, 1e-9, "forward then back");
        }
    }

    #[test]
    fn test_propagation_is_deterministic() {
        let elements = random_any();
        let epoch = elements.get_reference_epoch() + 250.0;
        let steps: Vec<(f64, f64)> = (0..256)
            .map(|_| (rand::random_range(-60.0..60.0), rand::random_range(-2.0..2.0)))
            .collect();

        let run = || {
            let mut orbit = Orbit::with_config(elements, &au_config());
            orbit.anchor_at_epoch(epoch).unwrap();
            steps
                .iter()
                .map(|&(delta, rate)| orbit.advance(delta, rate).unwrap())
                .collect::<Vec<_>>()
        };

        for (i, (a, b)) in run().into_iter().zip(run()).enumerate() {
            assert_eq_vec3(a, b, &format!("step {i}"));
        }
    }

    #[test]
    fn test_failed_placement_keeps_state() {
        let mut orbit = anchored_random_orbit(&au_config());
        let before = *orbit.get_state();

        assert!(matches!(
            orbit.from_mean_anomaly(f64::NAN),
            Err(PropagationError::Convergence(_))
        ));
        assert_eq_state(orbit.get_state(), &before, "after a failed placement");
    }

    #[test]
    fn test_resolution_cache() {
        let elements = random_any();
        let reference = elements.get_reference_epoch();
        let mut orbit = Orbit::new(elements);

        orbit.set_epoch(reference + 5000.0).unwrap();
        let first = *orbit.get_resolved_elements();
        assert_almost_eq_within(
            orbit.get_resolved_centuries(),
            5000.0 / DAYS_PER_JULIAN_CENTURY,
            1e-12,
            "resolved centuries",
        );

        orbit.set_epoch(reference + 5000.0).unwrap();
        assert_eq!(*orbit.get_resolved_elements(), first);

        orbit.set_epoch(reference - 5000.0).unwrap();
        orbit.set_epoch(reference + 5000.0).unwrap();
        let again = orbit.get_resolved_elements();
        assert_eq!(again.semi_major_axis.to_bits(), first.semi_major_axis.to_bits());
        assert_eq!(again.eccentricity.to_bits(), first.eccentricity.to_bits());
        assert_eq!(
            again.long_of_periapsis.to_bits(),
            first.long_of_periapsis.to_bits()
        );
    }

    #[test]
    fn test_set_epoch_leaves_anomalies_alone() {
        let mut orbit = anchored_random_orbit(&au_config());
        let before = *orbit.get_state();

        orbit
            .set_epoch(orbit.get_elements().get_reference_epoch() + 3000.0)
            .unwrap();
        assert_eq_state(orbit.get_state(), &before, "after re-resolving");
    }

    #[test]
    fn test_degenerate_drift() {
        let elements = OrbitalElementSet::new(
            1.0,
            0.9,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            J2000_JDN,
            SecularRates {
                eccentricity: 0.5,
                ..Default::default()
            },
        )
        .unwrap();

        let mut orbit = Orbit::with_config(elements, &au_config());
        orbit.anchor_at_epoch(J2000_JDN).unwrap();
        let before = *orbit.get_state();

        let error = orbit
            .set_epoch(J2000_JDN + DAYS_PER_JULIAN_CENTURY)
            .unwrap_err();
        match error {
            PropagationError::DegenerateElements {
                centuries,
                eccentricity,
                ..
            } => {
                assert_eq!(centuries, 1.0);
                assert_almost_eq(eccentricity, 1.4, "drifted eccentricity");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(orbit.get_resolved_centuries(), 0.0);
        assert_eq!(orbit.get_resolved_elements().eccentricity, 0.9);

        assert!(orbit
            .anchor_at_epoch(J2000_JDN + DAYS_PER_JULIAN_CENTURY)
            .is_err());
        assert_eq_state(orbit.get_state(), &before, "after a failed anchor");
        assert_eq!(orbit.get_phase(), PropagationPhase::Anchored);

        // Still usable at the old resolution.
        orbit.advance(1.0, 1.0).unwrap();
    }

    #[test]
    fn test_failed_anchor_keeps_resolution() {
        // A subnormal period makes the mean motion infinite, so Kepler's
        // equation fails after the elements have been resolved.
        let elements = OrbitalElementSet::new(
            1.0,
            0.1,
            0.0,
            0.0,
            0.0,
            0.0,
            f64::from_bits(1),
            J2000_JDN,
            SecularRates {
                semi_major_axis: 0.1,
                eccentricity: 0.01,
                ..Default::default()
            },
        )
        .unwrap();

        let mut orbit = Orbit::with_config(elements, &au_config());
        let resolved_before = *orbit.get_resolved_elements();

        let error = orbit
            .anchor_at_epoch(J2000_JDN + DAYS_PER_JULIAN_CENTURY)
            .unwrap_err();
        assert!(matches!(error, PropagationError::Convergence(_)));

        assert_eq!(orbit.get_resolved_centuries(), 0.0);
        assert_eq!(*orbit.get_resolved_elements(), resolved_before);
        assert_eq!(orbit.get_phase(), PropagationPhase::Uninitialized);
    }

    #[test]
    fn test_epoch_precision() {
        let elements = body_presets::planets::mercury_elements();
        let midnight = CalendarDate::new(2021, 7, 4);
        let evening = midnight.with_time(18, 0, 0);

        let mut orbit = Orbit::new(elements);
        let a = orbit.set_from_date(&midnight).unwrap();
        let b = orbit.set_from_date(&evening).unwrap();
        assert_eq_vec3(a, b, "day precision ignores the time of day");

        let config = SimulationConfig {
            epoch_precision: EpochPrecision::SubDay,
            ..Default::default()
        };
        let mut orbit = Orbit::with_config(elements, &config);
        let a = orbit.set_from_date(&midnight).unwrap();
        let b = orbit.set_from_date(&evening).unwrap();
        assert!(a.distance(b) > 0.0, "sub-day precision keeps the time of day");
    }

    #[test]
    fn test_sample_path_uses_resolved_elements() {
        let mut orbit = Orbit::with_config(body_presets::planets::mars_elements(), &au_config());
        orbit.set_from_date(&CalendarDate::new(2150, 1, 1)).unwrap();

        let path = orbit.sample_path();
        let expected = orbit.get_projector().sample_path(orbit.get_resolved_elements());
        assert_eq!(path, expected);
        assert_ne!(
            path,
            orbit
                .get_projector()
                .sample_path(&orbit.get_elements().at_reference_epoch())
        );
    }
}

#[cfg(feature = "serde")]
mod persistence {
    use super::*;

    #[test]
    fn test_invalid_elements_are_rejected_on_load() {
        let cases = [
            ("eccentricity", 1.5),
            ("eccentricity", -0.1),
            ("period", 0.0),
            ("semi_major_axis", -2.0),
        ];

        for (field, value) in cases {
            let mut json = serde_json::to_value(body_presets::planets::earth_elements()).unwrap();
            json[field] = serde_json::json!(value);

            assert!(
                serde_json::from_value::<OrbitalElementSet>(json).is_err(),
                "{field} = {value} was accepted"
            );
        }

        let json = serde_json::to_value(body_presets::planets::earth_elements()).unwrap();
        assert_eq!(
            serde_json::from_value::<OrbitalElementSet>(json).unwrap(),
            body_presets::planets::earth_elements()
        );
    }

    #[test]
    fn test_orbit_with_invalid_elements_is_rejected_on_load() {
        let mut orbit = Orbit::with_config(body_presets::planets::earth_elements(), &au_config());
        orbit.set_from_date(&CalendarDate::new(2024, 1, 1)).unwrap();

        let mut json = serde_json::to_value(&orbit).unwrap();
        json["elements"]["eccentricity"] = serde_json::json!(1.5);

        let error = serde_json::from_value::<Orbit>(json).unwrap_err();
        assert!(error.to_string().contains("eccentricity"), "{error}");
    }

    #[test]
    fn test_orbit_rejects_degenerate_resolution_on_load() {
        let elements = OrbitalElementSet::new(
            1.0,
            0.9,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            J2000_JDN,
            SecularRates {
                eccentricity: 0.5,
                ..Default::default()
            },
        )
        .unwrap();
        let mut orbit = Orbit::with_config(elements, &au_config());
        orbit.anchor_at_epoch(J2000_JDN).unwrap();

        let mut json = serde_json::to_value(&orbit).unwrap();
        json["resolved_centuries"] = serde_json::json!(1.0);

        assert!(serde_json::from_value::<Orbit>(json).is_err());
    }

    #[test]
    fn test_orbit_resumes_after_load() {
        let mut orbit = Orbit::with_config(body_presets::planets::mars_elements(), &au_config());
        orbit.set_from_date(&CalendarDate::new(2150, 1, 1)).unwrap();

        let text = serde_json::to_string(&orbit).unwrap();
        let mut loaded: Orbit = serde_json::from_str(&text).unwrap();

        assert_eq!(loaded.get_phase(), PropagationPhase::Anchored);
        assert_almost_eq_within(
            loaded.get_resolved_centuries(),
            orbit.get_resolved_centuries(),
            1e-12,
            "resolved centuries",
        );
        assert_almost_eq_within(
            loaded.get_resolved_elements().eccentricity,
            orbit.get_resolved_elements().eccentricity,
            1e-12,
            "resolved eccentricity",
        );

        for _ in 0..16 {
            let expected = orbit.advance(3600.0, 1.0).unwrap();
            let actual = loaded.advance(3600.0, 1.0).unwrap();
            assert_almost_eq_vec3_within(actual, expected, 1e-9, "position after load");
        }
    }
}

mod calendar {
    use super::*;

    #[test]
    fn test_known_julian_day_numbers() {
        let known = [
            ("J2000", CalendarDate::new(2000, 1, 1), 2_451_545),
            ("Unix epoch", CalendarDate::new(1970, 1, 1), 2_440_588),
            ("MJD zero", CalendarDate::new(1858, 11, 17), 2_400_001),
            ("Gregorian reform", CalendarDate::new(1582, 10, 15), 2_299_161),
            ("proleptic day zero", CalendarDate::new(-4713, 11, 24), 0),
            ("leap day", CalendarDate::new(2024, 2, 29), 2_460_370),
            ("after leap day", CalendarDate::new(2024, 3, 1), 2_460_371),
        ];

        for (what, date, expected) in known {
            assert_eq!(julian_day_number(&date), expected, "{what}");
        }
    }

    #[test]
    fn test_julian_day_number_ignores_time() {
        let date = CalendarDate::new(2024, 10, 17);
        assert_eq!(
            date.with_time(23, 59, 59).julian_day_number(),
            date.julian_day_number()
        );
    }

    #[test]
    fn test_julian_day_number_counts_days() {
        let j2000 = Epoch::from_gregorian_utc(2000, 1, 1, 12, 0, 0, 0);

        for _ in 0..RANDOM_CASES {
            let days: i64 = rand::random_range(-30_000..30_000);
            let date = CalendarDate::from(j2000 + Duration::from_days(days as f64));

            assert_eq!(
                date.julian_day_number(),
                2_451_545 + days,
                "{days} days from J2000 is {date}"
            );
        }
    }

    #[test]
    fn test_epoch_precision() {
        let date = CalendarDate::new(2000, 1, 1);

        assert_eq!(date.epoch(EpochPrecision::Day), J2000_JDN);
        assert_eq!(date.epoch(EpochPrecision::SubDay), J2000_JDN - 0.5);
        assert_eq!(
            date.with_time(12, 0, 0).epoch(EpochPrecision::SubDay),
            J2000_JDN
        );
        assert_eq!(
            date.with_time(18, 0, 0).epoch(EpochPrecision::SubDay),
            J2000_JDN + 0.25
        );
    }

    #[test]
    fn test_parse() {
        let cases = [
            ("2024-03-20", CalendarDate::new(2024, 3, 20)),
            (
                "2024-03-20T06:30",
                CalendarDate::new(2024, 3, 20).with_time(6, 30, 0),
            ),
            (
                "2024-03-20 06:30:15Z",
                CalendarDate::new(2024, 3, 20).with_time(6, 30, 15),
            ),
            (
                "2024-03-20T06:30:15 UTC",
                CalendarDate::new(2024, 3, 20).with_time(6, 30, 15),
            ),
            ("2024-02-29", CalendarDate::new(2024, 2, 29)),
            ("  1999-12-31  ", CalendarDate::new(1999, 12, 31)),
        ];

        for (text, expected) in cases {
            assert_eq!(text.parse::<CalendarDate>(), Ok(expected), "{text:?}");
        }
    }

    #[test]
    fn test_parse_errors() {
        let impossible = ["2023-02-30", "2023-02-29", "2024-04-31", "2024-13-01", "2024-03"];
        for text in impossible {
            assert_eq!(
                text.parse::<CalendarDate>(),
                Err(DateError {
                    text: text.to_string(),
                    source: HifitimeError::InvalidGregorianDate,
                }),
                "{text:?}"
            );
        }

        let malformed = ["2024-03-20T25:00", "20x4-01-01", "March 20th", "-0044-03-15"];
        for text in malformed {
            let error = text.parse::<CalendarDate>().unwrap_err();
            assert_eq!(error.text, text);
            assert!(
                matches!(error.source, HifitimeError::Parse { .. }),
                "{text:?} gave {error}"
            );
        }
    }

    #[test]
    fn test_to_epoch_rejects_impossible_dates() {
        let cases = [
            CalendarDate::new(2023, 2, 30),
            CalendarDate::new(2023, 0, 1),
            CalendarDate::new(2023, 6, 0),
            CalendarDate::new(2023, 6, 1).with_time(25, 0, 0),
            CalendarDate::new(2023, 6, 1).with_time(12, 60, 0),
        ];

        for date in cases {
            let error = date.to_epoch().unwrap_err();
            assert_eq!(error.text, date.to_string());
            assert_eq!(error.source, HifitimeError::InvalidGregorianDate);
        }

        assert_eq!(
            CalendarDate::new(2000, 1, 1).with_time(12, 0, 0).to_epoch(),
            Ok(Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0))
        );
    }

    #[test]
    fn test_display_parses_back() {
        for _ in 0..RANDOM_CASES {
            let date = CalendarDate::new(
                rand::random_range(1600..2400),
                rand::random_range(1..=12),
                rand::random_range(1..=28),
            )
            .with_time(
                rand::random_range(0..24),
                rand::random_range(0..60),
                rand::random_range(0..60),
            );

            assert_eq!(date.to_string().parse::<CalendarDate>(), Ok(date));
        }
    }
}

mod clock {
    use super::*;

    #[test]
    fn test_speed_and_pause() {
        let mut clock = SimulationClock::at_date(&CalendarDate::new(2000, 1, 1)).unwrap();
        clock.set_speed(43_200.0);
        assert_eq!(clock.days_per_second(), 0.5);

        clock.pause();
        assert!(clock.is_paused());
        assert_eq!(clock.days_per_second(), 0.0);
        assert_eq!(clock.tick(100.0), 0.0);
        assert_eq!(clock.date(), CalendarDate::new(2000, 1, 1));

        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert_eq!(clock.tick(4.0), 172_800.0);
        assert_eq!(clock.date(), CalendarDate::new(2000, 1, 3));
    }

    #[test]
    fn test_reverse() {
        let mut clock = SimulationClock::default();
        clock.set_speed(-10.0 * 86_400.0);

        assert_eq!(clock.tick(1.0), -864_000.0);
        assert_eq!(
            clock.date(),
            CalendarDate::new(1999, 12, 22).with_time(12, 0, 0)
        );
    }

    #[test]
    fn test_jump() {
        let mut clock = SimulationClock::at_date(&CalendarDate::new(2024, 2, 28)).unwrap();
        clock.jump(Duration::from_days(2.0));
        assert_eq!(clock.date(), CalendarDate::new(2024, 3, 1));

        clock.set_time(CalendarDate::new(1990, 5, 5).to_epoch().unwrap());
        assert_eq!(clock.date(), CalendarDate::new(1990, 5, 5));
    }

    #[test]
    fn test_at_impossible_date() {
        let error = SimulationClock::at_date(&CalendarDate::new(2023, 2, 30)).unwrap_err();
        assert_eq!(error.source, HifitimeError::InvalidGregorianDate);
    }
}

mod presets {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        let planets = [
            body_presets::planets::mercury_elements(),
            body_presets::planets::venus_elements(),
            body_presets::planets::earth_elements(),
            body_presets::planets::mars_elements(),
            body_presets::planets::jupiter_elements(),
            body_presets::planets::saturn_elements(),
            body_presets::planets::uranus_elements(),
            body_presets::planets::neptune_elements(),
        ];

        let moon = body_presets::moons::the_moon_elements();

        for elements in planets.iter().chain([&moon]) {
            assert_eq!(elements.validate(), Ok(()), "{elements:?}");
            assert!(elements.resolve_centuries(-2.0).is_elliptic());
            assert!(elements.resolve_centuries(0.5).is_elliptic());
        }

        let bodies = body_presets::planets::all();
        assert_eq!(bodies.len(), 8);
        assert!(bodies.iter().all(|body| body.orbit.is_some()));
        assert!(body_presets::stars::the_sun().orbit.is_none());
    }

    #[test]
    fn test_rings() {
        assert!(body_presets::planets::saturn().get_ring().is_some());
        assert!(body_presets::planets::uranus().get_ring().is_some());
        assert_eq!(body_presets::planets::earth().get_ring(), None);
    }

    #[test]
    fn test_earth_at_j2000() {
        let config = SimulationConfig {
            conic_parameter: ConicParameter::Exact,
            ..au_config()
        };
        let mut orbit = Orbit::with_config(body_presets::planets::earth_elements(), &config);
        let position = orbit.set_from_date(&CalendarDate::new(2000, 1, 1)).unwrap();

        // Early January is just past perihelion.
        let distance = position.length();
        assert!((0.983..0.984).contains(&distance), "Earth at {distance} AU");
        assert!(orbit.get_true_anomaly() > 6.0, "{}", orbit.get_true_anomaly());
    }

    #[test]
    fn test_moon_distance() {
        let config = SimulationConfig {
            conic_parameter: ConicParameter::Exact,
            ..au_config()
        };
        let elements = body_presets::moons::the_moon_elements();
        let mut orbit = Orbit::with_config(elements, &config);

        for day in 0..60_u32 {
            let position = orbit
                .anchor_at_epoch(J2000_JDN + f64::from(day))
                .unwrap();
            let distance = position.length();
            assert!(
                distance >= elements.get_periapsis() * (1.0 - 1e-9)
                    && distance <= elements.get_apoapsis() * (1.0 + 1e-9),
                "Moon at {distance} AU on day {day}"
            );
        }
    }
}

mod universe {
    use super::*;

    fn solar_system() -> (Universe, [crate::BodyId; 3]) {
        let start = CalendarDate::new(2000, 1, 1).to_epoch().unwrap();
        let mut universe = Universe::new(au_config(), start);

        let sun = universe
            .add_body(body_presets::stars::the_sun(), None)
            .unwrap();
        let earth = universe
            .add_body(body_presets::planets::earth(), Some(sun))
            .unwrap();
        let moon = universe
            .add_body(body_presets::moons::the_moon(), Some(earth))
            .unwrap();

        (universe, [sun, earth, moon])
    }

    #[test]
    fn test_relations() {
        let (universe, [sun, earth, moon]) = solar_system();

        assert_eq!(universe.len(), 3);
        assert_eq!(universe.get_body_relation(sun).unwrap().parent, None);
        assert_eq!(universe.get_body_relation(sun).unwrap().satellites, vec![earth]);
        assert_eq!(universe.get_body_relation(moon).unwrap().parent, Some(earth));
        assert_eq!(universe.get_body_id_with_name("Moon"), Some(moon));
    }

    #[test]
    fn test_missing_parent() {
        let mut universe = Universe::default();
        let (error, body) = universe
            .add_body(body_presets::moons::the_moon(), Some(42))
            .unwrap_err();

        assert_eq!(error, BodyAddError::ParentNotFound(42));
        assert_eq!(body.name, "Moon");
        assert!(universe.is_empty());
    }

    #[test]
    fn test_bodies_are_anchored_on_insertion() {
        let (universe, [sun, earth, _]) = solar_system();

        assert_eq!(universe.get_body(sun).unwrap().position, DVec3::ZERO);

        let orbit = universe.get_body(earth).unwrap().orbit.as_ref().unwrap();
        assert_eq!(orbit.get_phase(), PropagationPhase::Anchored);
        assert_eq_vec3(
            universe.get_body(earth).unwrap().position,
            orbit.get_position(),
            "stored position",
        );
    }

    #[test]
    fn test_absolute_position() {
        let (mut universe, [sun, earth, moon]) = solar_system();
        assert!(universe.tick(3600.0).is_empty());

        let sun_position = universe.get_body(sun).unwrap().position;
        let earth_position = universe.get_body(earth).unwrap().position;
        let moon_position = universe.get_body(moon).unwrap().position;

        assert_eq_vec3(
            universe.get_body_position(moon).unwrap(),
            moon_position + (earth_position + sun_position),
            "Moon",
        );
        assert!(universe.get_body_position(42).is_none());
    }

    #[test]
    fn test_tick_matches_clock() {
        let (mut universe, [_, earth, _]) = solar_system();
        universe.clock_mut().set_speed(86_400.0);
        let before = universe.get_body(earth).unwrap().position;

        assert!(universe.tick(1.0).is_empty());
        assert_eq!(universe.date(), CalendarDate::new(2000, 1, 2));
        assert_ne!(universe.get_body(earth).unwrap().position, before);
    }

    #[test]
    fn test_paused_universe_stands_still() {
        let (mut universe, [_, earth, moon]) = solar_system();
        universe.clock_mut().pause();

        let date = universe.date();
        let earth_before = universe.get_body(earth).unwrap().position;
        let moon_before = universe.get_body(moon).unwrap().position;

        assert!(universe.tick(10.0).is_empty());

        assert_eq!(universe.date(), date);
        assert_eq_vec3(universe.get_body(earth).unwrap().position, earth_before, "Earth");
        assert_eq_vec3(universe.get_body(moon).unwrap().position, moon_before, "Moon");
    }

    #[test]
    fn test_failures_are_isolated() {
        let (mut universe, [_, earth, _]) = solar_system();

        // Valid, but so short-lived that its mean motion overflows.
        let elements = OrbitalElementSet::new(
            1.0,
            0.1,
            0.0,
            0.0,
            0.0,
            0.0,
            f64::from_bits(1),
            J2000_JDN,
            SecularRates::default(),
        )
        .unwrap();
        let broken = universe
            .add_body(
                Body::new("Broken".to_string(), 1.0, Some(Orbit::new(elements))),
                None,
            )
            .unwrap();

        let earth_before = universe.get_body(earth).unwrap().position;
        let failures = universe.tick(60.0);

        assert_eq!(failures, vec![(broken, PropagationError::NotAnchored)]);
        assert_eq!(universe.get_body(broken).unwrap().position, DVec3::ZERO);
        assert_ne!(universe.get_body(earth).unwrap().position, earth_before);

        let failures = universe.set_date(&CalendarDate::new(2001, 1, 1)).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, broken);
        assert!(matches!(failures[0].1, PropagationError::Convergence(_)));
    }

    #[test]
    fn test_set_date_reanchors() {
        let (mut universe, [_, earth, _]) = solar_system();
        let date = CalendarDate::new(2024, 3, 20);

        assert!(universe.set_date(&date).unwrap().is_empty());
        assert_eq!(universe.date(), date);

        let mut orbit = Orbit::with_config(body_presets::planets::earth_elements(), &au_config());
        let expected = orbit.set_from_date(&date).unwrap();
        assert_eq_vec3(universe.get_body(earth).unwrap().position, expected, "Earth");
    }

    #[test]
    fn test_set_impossible_date() {
        let (mut universe, [_, earth, _]) = solar_system();
        let date_before = universe.date();
        let earth_before = universe.get_body(earth).unwrap().position;

        let impossible = CalendarDate::new(2023, 2, 30);
        let error = universe.set_date(&impossible).unwrap_err();

        assert_eq!(error.source, HifitimeError::InvalidGregorianDate);
        assert_eq!(universe.date(), date_before);
        assert_eq!(universe.get_body(earth).unwrap().position, earth_before);
    }

    #[test]
    fn test_set_config_rescales() {
        let (mut universe, [_, earth, _]) = solar_system();
        let in_au = universe.get_body(earth).unwrap().position;

        let failures = universe.set_config(SimulationConfig {
            distance_scale: 1000.0,
            ..au_config()
        });
        assert!(failures.is_empty());

        let in_thousands_of_km = universe.get_body(earth).unwrap().position;
        assert_relative_eq(
            in_thousands_of_km.length(),
            in_au.length() * KM_PER_AU / 1000.0,
            1e-12,
            "rescaled distance",
        );
    }

    #[test]
    fn test_remove_body() {
        let (mut universe, [sun, earth, moon]) = solar_system();

        let removed = universe.remove_body(earth);
        let mut names: Vec<_> = removed.iter().map(|body| body.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Earth", "Moon"]);

        assert_eq!(universe.len(), 1);
        assert!(universe.get_body(moon).is_none());
        assert!(universe.get_body_relation(sun).unwrap().satellites.is_empty());
        assert!(universe.remove_body(earth).is_empty());
    }
}
