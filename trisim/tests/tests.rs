use approx::assert_relative_eq;

use trisim::simulation::units::{AU, G_ASTRO, G_SI, SOLAR_MASS, YEAR};
use trisim::{
    circular_return_error, gravitational_acceleration, gravitational_jerk, hermite, hermite_step,
    integrate, leapfrog, leapfrog_step, orbital_period, sweep, two_body_elements, BinaryElements,
    Body, Diagnostics, Engine, IntegratorKind, NVec3, NewtonianGravity, Parameters, Phase,
    RunOptions, RunRecord, RunReport, RunStatus, Scenario, ScenarioConfig, SimError, Subsystem,
    SweepRun, System, TripleElements, UnitSystem,
};

/// Circular equal-mass binary, relative semi-major axis 1 AU, in the COM
/// frame. Returns the system, a subsystem of both bodies and the period.
pub fn circular_binary() -> (System, Subsystem, f64) {
    eccentric_binary(0.0)
}

pub fn eccentric_binary(ecc: f64) -> (System, Subsystem, f64) {
    let elements = BinaryElements {
        masses: [1.0, 1.0],
        sma: 1.0,
        ecc,
    };
    let sys = System::new(elements.bodies(G_ASTRO).unwrap(), G_ASTRO)
        .unwrap()
        .recentered();
    let reference = Subsystem::all(&sys);
    (sys, reference, elements.period(G_ASTRO))
}

/// Hierarchical triple with an 80 degree outer inclination, inner binary as
/// reference
pub fn triple() -> (System, Subsystem) {
    let bodies = TripleElements {
        masses: [1.0, 1.0, 0.1],
        sma: [2.0, 7.0],
        ecc: [0.0, 0.1],
        inclination: 80.0,
    }
    .bodies(G_ASTRO)
    .unwrap();
    let sys = System::new(bodies, G_ASTRO).unwrap().recentered();
    let reference = Subsystem::new(&sys, vec![0, 1]).unwrap();
    (sys, reference)
}

/// Two bodies at rest on the x axis, `dist` apart, `G = 0.1`
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body::new(m1, [-dist / 2.0, 0.0, 0.0].into(), NVec3::zeros());
    let b2 = Body::new(m2, [dist / 2.0, 0.0, 0.0].into(), NVec3::zeros());
    System::new(vec![b1, b2], 0.1).unwrap()
}

fn quiet() -> RunOptions {
    RunOptions {
        recover_params: false,
        ..RunOptions::default()
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let mut sys = two_body_system(1.0, 2.0, 3.0);
    let gravity = NewtonianGravity::new(sys.G());
    gravity.accelerations(sys.bodies_mut(), Phase::Current, 0.0).unwrap();

    let b = sys.bodies();
    let net = b[0].a * b[0].m() + b[1].a * b[1].m();

    assert!(net.norm() < 1e-12, "Net force not zero: {:?}", net);
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    let a1 = gravitational_acceleration(&sys, 0).unwrap();
    let dx = sys.bodies()[1].q - sys.bodies()[0].q;

    assert!(a1.dot(&dx) > 0.0, "Acceleration is not toward second body");
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);

    let ratio = gravitational_acceleration(&sys_r, 0).unwrap().norm()
        / gravitational_acceleration(&sys_2r, 0).unwrap().norm();

    assert_relative_eq!(ratio, 4.0, max_relative = 1e-12);
}

#[test]
fn batch_evaluation_matches_single_body_sums() {
    let (sys, _) = triple();
    let mut bodies = sys.bodies().to_vec();
    NewtonianGravity::new(sys.G())
        .accelerations_and_jerks(&mut bodies, Phase::Current, 0.0)
        .unwrap();

    for (i, b) in bodies.iter().enumerate() {
        let a = gravitational_acceleration(&sys, i).unwrap();
        let j = gravitational_jerk(&sys, i).unwrap();
        assert!((b.a - a).norm() <= 1e-12 * a.norm(), "acceleration of body {i} differs");
        assert!((b.j - j).norm() <= 1e-12 * j.norm(), "jerk of body {i} differs");
    }
}

#[test]
fn jerk_is_time_derivative_of_acceleration() {
    let (sys, _) = triple();
    let eps = 1e-5;

    // move every body along its velocity, keep velocities
    let shifted = |sign: f64| {
        let bodies = sys
            .bodies()
            .iter()
            .map(|b| Body::new(b.m(), b.q + sign * eps * b.v, b.v))
            .collect();
        System::new(bodies, sys.G()).unwrap()
    };
    let (ahead, behind) = (shifted(1.0), shifted(-1.0));

    for i in 0..sys.len() {
        let a_ahead = gravitational_acceleration(&ahead, i).unwrap();
        let a_behind = gravitational_acceleration(&behind, i).unwrap();
        let fd = (a_ahead - a_behind) / (2.0 * eps);
        let jerk = gravitational_jerk(&sys, i).unwrap();
        assert!((fd - jerk).norm() <= 1e-6 * jerk.norm(), "body {i}: {fd:?} vs {jerk:?}");
    }
}

#[test]
fn predicted_phase_writes_predicted_fields() {
    let (mut sys, _) = triple();
    let gravity = NewtonianGravity::new(sys.G());
    for b in sys.bodies_mut() {
        b.qp = b.q;
        b.vp = b.v;
    }
    gravity.accelerations_and_jerks(sys.bodies_mut(), Phase::Predicted, 0.0).unwrap();
    gravity.accelerations_and_jerks(sys.bodies_mut(), Phase::Current, 0.0).unwrap();

    for b in sys.bodies() {
        assert_eq!(b.a, b.ap);
        assert_eq!(b.j, b.jp);
        assert!(b.a.norm() > 0.0);
    }
}

#[test]
fn coincident_bodies_are_singular() {
    let sys = two_body_system(0.0, 1.0, 1.0);

    let err = gravitational_acceleration(&sys, 1).unwrap_err();
    assert!(matches!(err, SimError::Singularity { i: 0, j: 1, .. }), "{err:?}");
    assert!(gravitational_jerk(&sys, 0).is_err());
}

#[test]
fn out_of_range_body_is_an_error() {
    let sys = two_body_system(1.0, 1.0, 1.0);

    assert!(matches!(
        gravitational_acceleration(&sys, 2),
        Err(SimError::InvalidSubsystem(_))
    ));
    assert!(matches!(
        gravitational_jerk(&sys, 7),
        Err(SimError::InvalidSubsystem(_))
    ));
}

// ==================================================================================
// State tests
// ==================================================================================

#[test]
fn com_shift_zeroes_momentum_and_position() {
    let bodies = vec![
        Body::new(1.0, [1.0, 2.0, 3.0].into(), [0.3, -1.0, 2.0].into()),
        Body::new(2.5, [-4.0, 0.5, 1.0].into(), [1.5, 0.2, -0.7].into()),
        Body::new(0.2, [0.0, -3.0, 7.0].into(), [-9.0, 4.0, 0.1].into()),
    ];
    let sys = System::new(bodies, 1.0).unwrap().recentered();
    let view = sys.view();

    assert!(view.momentum().norm() < 1e-12, "{:?}", view.momentum());
    assert!(view.com().norm() < 1e-12);
    assert!(view.com_velocity().norm() < 1e-12);
}

#[test]
fn invalid_masses_are_rejected() {
    for (mass, index) in [(0.0, 1), (-1.0, 1), (f64::NAN, 1)] {
        let bodies = vec![
            Body::new(1.0, NVec3::zeros(), NVec3::zeros()),
            Body::new(mass, NVec3::x(), NVec3::zeros()),
        ];
        match System::new(bodies, 1.0) {
            Err(SimError::InvalidMass { index: i, .. }) => assert_eq!(i, index),
            other => panic!("expected InvalidMass, got {other:?}"),
        }
    }
}

#[test]
fn empty_system_and_bad_constants_are_rejected() {
    assert!(matches!(System::new(vec![], 1.0), Err(SimError::EmptySystem)));

    let body = || vec![Body::new(1.0, NVec3::zeros(), NVec3::zeros())];
    assert!(matches!(System::new(body(), 0.0), Err(SimError::InvalidGravitationalConstant(_))));

    let nan_body = vec![Body::new(1.0, [f64::NAN, 0.0, 0.0].into(), NVec3::zeros())];
    assert!(matches!(System::new(nan_body, 1.0), Err(SimError::NonFiniteState { index: 0 })));
}

#[test]
fn subsystem_indices_are_validated() {
    let (sys, _) = triple();

    assert!(Subsystem::new(&sys, vec![0, 5]).is_err());
    assert!(Subsystem::new(&sys, vec![1, 1]).is_err());
    assert!(Subsystem::new(&sys, vec![]).is_err());
    assert_eq!(Subsystem::new(&sys, vec![2, 0]).unwrap().members(), &[2, 0]);
}

#[test]
fn cardinality_guards() {
    let (sys, inner) = triple();
    let single = Subsystem::new(&sys, vec![2]).unwrap();

    // three members: plane angle only
    assert!(sys.view().eccentricity().is_none());
    assert!(sys.view().semi_major_axis().is_none());
    assert!(sys.view().plane_angle().is_some());

    // two members: orbital elements only
    assert!(inner.view(&sys).eccentricity().is_some());
    assert!(inner.view(&sys).semi_major_axis().is_some());
    assert!(inner.view(&sys).plane_angle().is_none());

    // one member: nothing
    assert!(single.view(&sys).eccentricity().is_none());
    assert!(single.view(&sys).semi_major_axis().is_none());
    assert!(single.view(&sys).plane_angle().is_none());
}

#[test]
fn binary_elements_are_recovered() {
    let (sys, _, _) = circular_binary();
    let view = sys.view();
    assert!(view.eccentricity().unwrap() < 1e-6);
    assert_relative_eq!(view.semi_major_axis().unwrap(), 1.0, max_relative = 1e-12);

    let (sys, _, _) = eccentric_binary(0.5);
    let view = sys.view();
    assert_relative_eq!(view.eccentricity().unwrap(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(view.semi_major_axis().unwrap(), 1.0, max_relative = 1e-12);
    // E = -G m1 m2 / 2a
    assert_relative_eq!(view.energy(), -G_ASTRO / 2.0, max_relative = 1e-12);

    let elements = two_body_elements(view.body(0), view.body(1), sys.G());
    assert_relative_eq!(elements.eccentricity, 0.5, epsilon = 1e-9);
    assert_relative_eq!(elements.semi_major_axis, 1.0, max_relative = 1e-12);
}

#[test]
fn com_semi_major_axis_is_second_member_about_pair_com() {
    // each body 1 AU from the COM on a circular orbit
    let half_speed = G_ASTRO.sqrt() / 2.0;
    let bodies = vec![
        Body::new(1.0, [0.0, -1.0, 0.0].into(), [half_speed, 0.0, 0.0].into()),
        Body::new(1.0, [0.0, 1.0, 0.0].into(), [-half_speed, 0.0, 0.0].into()),
    ];
    let sys = System::new(bodies, G_ASTRO).unwrap();
    let view = sys.view();

    // -G mu m1 / (2E) against the relative -G m1 m2 / (2E)
    let mu = view.reduced_mass();
    let expected = -G_ASTRO * mu * 1.0 / (2.0 * view.energy());
    assert_relative_eq!(view.com_semi_major_axis().unwrap(), expected, max_relative = 1e-12);
    assert_relative_eq!(view.com_semi_major_axis().unwrap(), 1.0, max_relative = 1e-12);
    assert_relative_eq!(view.semi_major_axis().unwrap(), 2.0, max_relative = 1e-12);

    // unequal masses: the heavier second member sits a m1 / M from the COM
    let elements = BinaryElements {
        masses: [1.0, 3.0],
        sma: 1.0,
        ecc: 0.0,
    };
    let sys = System::new(elements.bodies(G_ASTRO).unwrap(), G_ASTRO).unwrap();
    assert_relative_eq!(sys.view().com_semi_major_axis().unwrap(), 0.25, max_relative = 1e-12);
    assert_relative_eq!(sys.bodies()[1].q.norm(), 0.25, max_relative = 1e-12);

    let (triple, _) = triple();
    assert!(triple.view().com_semi_major_axis().is_none());
}

#[test]
fn plane_angle_undefined_for_radial_outer_motion() {
    let bodies = vec![
        Body::new(1.0, [-1.0, 0.0, 0.0].into(), [0.0, 1.0, 0.0].into()),
        Body::new(1.0, [1.0, 0.0, 0.0].into(), [0.0, -1.0, 0.0].into()),
        Body::new(1.0, [0.0, 0.0, 5.0].into(), [0.0, 0.0, 1.0].into()),
    ];
    let sys = System::new(bodies, 1.0).unwrap();

    assert_eq!(sys.view().plane_angle(), None);
}

#[test]
fn triple_outer_orbit_and_plane_angle() {
    let (sys, inner) = triple();

    let outer = two_body_elements(&inner.view(&sys).aggregate(), &sys.bodies()[2], sys.G());
    assert_relative_eq!(outer.semi_major_axis, 7.0, max_relative = 1e-12);
    assert_relative_eq!(outer.eccentricity, 0.1, epsilon = 1e-12);

    assert_relative_eq!(inner.view(&sys).aggregate().m, 2.0);
    assert_relative_eq!(sys.view().plane_angle().unwrap(), 80.0, epsilon = 1e-9);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

/// Largest relative deviation of the second body's distance from the origin
/// over one period integrated with `steps` steps
fn radius_deviation(kind: IntegratorKind, steps: usize) -> f64 {
    let (mut sys, _, period) = circular_binary();
    let gravity = NewtonianGravity::new(sys.G());
    let r0 = sys.bodies()[1].q.norm();
    let h = period / steps as f64;

    let mut dev: f64 = 0.0;
    for _ in 0..steps {
        match kind {
            IntegratorKind::Leapfrog => leapfrog_step(&mut sys, &gravity, h).unwrap(),
            IntegratorKind::Hermite => hermite_step(&mut sys, &gravity, h).unwrap(),
        }
        dev = dev.max((sys.bodies()[1].q.norm() - r0).abs() / r0);
    }
    dev
}

#[test]
fn leapfrog_keeps_circular_orbit_radius() {
    let coarse = radius_deviation(IntegratorKind::Leapfrog, 365);
    let fine = radius_deviation(IntegratorKind::Leapfrog, 730);

    assert!(coarse < 5e-4, "radius deviation {coarse}");
    assert!(fine < coarse / 2.0, "no tightening: {fine} vs {coarse}");
}

#[test]
fn hermite_keeps_circular_orbit_radius() {
    let coarse = radius_deviation(IntegratorKind::Hermite, 365);
    let fine = radius_deviation(IntegratorKind::Hermite, 730);

    assert!(coarse < 1e-7, "radius deviation {coarse}");
    assert!(fine < coarse / 2.0, "no tightening: {fine} vs {coarse}");
}

#[test]
fn leapfrog_binary_returns_after_one_period() {
    let (mut sys, reference, period) = circular_binary();
    let start = sys.bodies()[0].q;

    let options = RunOptions::default();
    let outcome = leapfrog(&mut sys, &reference, period, period / 365.0, &options).unwrap();

    assert_eq!(outcome.steps_taken, 365);
    assert_eq!(outcome.final_time, period);
    let miss = (sys.bodies()[0].q - start).norm();
    assert!(miss < 1e-3, "position missed by {miss} AU");
}

#[test]
fn leapfrog_energy_error_stays_bounded() {
    let run = |orbits: f64| {
        let (mut sys, reference, period) = eccentric_binary(0.5);
        let h = period / 200.0;
        let outcome =
            leapfrog(&mut sys, &reference, orbits * period, h, &RunOptions::default()).unwrap();
        outcome.diagnostics.unwrap().max_relative_energy_error()
    };

    let short = run(10.0);
    let long = run(40.0);

    assert!(short < 1e-2, "energy error {short}");
    assert!(long <= 1.5 * short, "secular drift: {long} vs {short}");
}

#[test]
fn angular_momentum_is_conserved() {
    for (kind, tol) in [(IntegratorKind::Leapfrog, 1e-12), (IntegratorKind::Hermite, 1e-7)] {
        let (mut sys, reference) = triple();
        let l0 = sys.view().angular_momentum().norm();

        let params = Parameters::new(20.0, 0.01);
        let outcome =
            integrate(kind, &mut sys, &reference, &params, &RunOptions::default()).unwrap();
        let drift = outcome.diagnostics.unwrap().angular_momentum_drift();

        assert!(drift <= tol * l0, "{kind}: drift {drift} of {l0}");
    }
}

#[test]
fn convergence_matches_formal_order() {
    let lf = circular_return_error(IntegratorKind::Leapfrog, 128).unwrap()
        / circular_return_error(IntegratorKind::Leapfrog, 256).unwrap();
    let he = circular_return_error(IntegratorKind::Hermite, 64).unwrap()
        / circular_return_error(IntegratorKind::Hermite, 128).unwrap();

    assert!((3.5..4.5).contains(&lf), "leapfrog ratio {lf}");
    assert!((12.0..20.0).contains(&he), "hermite ratio {he}");
}

#[test]
fn runs_are_deterministic() {
    let run = || {
        let (mut sys, reference) = triple();
        let outcome = hermite(&mut sys, &reference, 2.0, 0.01, &RunOptions::default()).unwrap();
        (outcome.diagnostics.unwrap(), sys.bodies()[2].q)
    };

    let (d1, q1) = run();
    let (d2, q2) = run();
    assert_eq!(d1, d2);
    assert_eq!(q1, q2);
}

// ==================================================================================
// Schedule and engine tests
// ==================================================================================

#[test]
fn schedule_truncates_final_step() {
    let schedule = Parameters::new(1.0, 0.3).schedule().unwrap();

    assert_eq!(schedule.steps(), 4);
    assert_eq!(schedule.step_size(0), 0.3);
    assert_relative_eq!(schedule.step_size(3), 0.1, epsilon = 1e-12);
    assert_eq!(schedule.elapsed_after(4), 1.0);
}

#[test]
fn schedule_absorbs_rounding_in_step_count() {
    let (_, _, period) = circular_binary();
    assert_eq!(Parameters::new(period, period / 365.0).schedule().unwrap().steps(), 365);
    assert_eq!(Parameters::new(1.0, 0.1).schedule().unwrap().steps(), 10);
}

#[test]
fn run_ends_exactly_on_duration() {
    let (mut sys, reference, _) = circular_binary();
    let outcome = leapfrog(&mut sys, &reference, 1.0, 0.3, &quiet()).unwrap();

    assert_eq!(outcome.steps_taken, 4);
    assert_eq!(outcome.final_time, 1.0);
    assert_eq!(sys.time(), 1.0);
    assert!(outcome.diagnostics.is_none());
}

#[test]
fn snapshots_follow_cadence() {
    let (mut sys, reference) = triple();
    let options = RunOptions {
        record_every: 3,
        ..RunOptions::default()
    };
    let outcome = hermite(&mut sys, &reference, 1.0, 0.1, &options).unwrap();
    let diagnostics = outcome.diagnostics.unwrap();

    let steps: Vec<usize> = diagnostics.snapshots().iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![0, 3, 6, 9, 10]);

    let series = diagnostics.series();
    assert_eq!(series.len(), 5);
    assert_eq!(series.energy.len(), series.eccentricity.len());
    assert_eq!(series.angular_momentum.len(), series.plane_angle.len());
    assert_eq!(series.semi_major_axis.len(), series.time.len());
    assert!(series.time.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(series.time[4], 1.0);

    // reference is the inner binary, full system has three bodies
    assert!(series.eccentricity.iter().all(Option::is_some));
    assert!(series.plane_angle.iter().all(Option::is_some));
}

#[test]
fn record_snapshots_current_state() {
    let (sys, reference) = triple();
    let mut diagnostics = Diagnostics::new();

    let snap = diagnostics.record(0, &sys, &reference).unwrap().clone();
    assert_eq!(snap.time, 0.0);
    assert_eq!(snap.energy, sys.view().energy());
    assert_eq!(snap.semi_major_axis, reference.view(&sys).semi_major_axis());
    assert!(snap.positions.is_none());
    assert_eq!(diagnostics.len(), 1);

    // a subsystem of the triple does not fit a binary
    let (binary, _, _) = circular_binary();
    let outer = Subsystem::new(&sys, vec![1, 2]).unwrap();
    assert!(matches!(
        diagnostics.record(1, &binary, &outer),
        Err(SimError::InvalidSubsystem(_))
    ));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn snapshots_carry_com_frame_trajectory() {
    let (mut sys, reference) = triple();
    let q0: Vec<NVec3> = sys.bodies().iter().map(|b| b.q).collect();
    let options = RunOptions {
        record_every: 3,
        ..RunOptions::default()
    };
    let diagnostics = hermite(&mut sys, &reference, 1.0, 0.1, &options)
        .unwrap()
        .diagnostics
        .unwrap();

    let positions = diagnostics.series().positions.unwrap();
    assert_eq!(positions.len(), 5);
    assert!(positions.iter().all(|p| p.len() == 3));

    // the system starts in its COM frame
    for (p, q) in positions[0].iter().zip(&q0) {
        assert!((p - q).norm() < 1e-12);
    }
    // COM-frame positions weigh to zero
    let masses: Vec<f64> = sys.bodies().iter().map(|b| b.m()).collect();
    for frame in &positions {
        let weighted = frame
            .iter()
            .zip(&masses)
            .fold(NVec3::zeros(), |acc, (p, m)| acc + p * *m);
        assert!(weighted.norm() < 1e-10, "{weighted:?}");
    }
    let last = sys.view().com_positions();
    assert_eq!(positions[4], last);

    let (mut sys, reference) = triple();
    let no_trajectory = RunOptions {
        record_positions: false,
        ..RunOptions::default()
    };
    let diagnostics = hermite(&mut sys, &reference, 1.0, 0.1, &no_trajectory)
        .unwrap()
        .diagnostics
        .unwrap();
    assert!(diagnostics.series().positions.is_none());
    assert!(diagnostics.snapshots().iter().all(|s| s.positions.is_none()));
}

#[test]
fn invalid_configuration_is_rejected_before_stepping() {
    let (mut sys, reference, _) = circular_binary();
    let q0 = sys.bodies()[0].q;

    assert!(matches!(
        leapfrog(&mut sys, &reference, 1.0, 0.0, &quiet()),
        Err(SimError::InvalidStep(_))
    ));
    assert!(matches!(
        hermite(&mut sys, &reference, -1.0, 0.1, &quiet()),
        Err(SimError::InvalidDuration(_))
    ));
    let no_cadence = RunOptions {
        record_every: 0,
        ..RunOptions::default()
    };
    assert!(matches!(
        leapfrog(&mut sys, &reference, 1.0, 0.1, &no_cadence),
        Err(SimError::InvalidCadence)
    ));

    // built against the triple, body 2 does not exist in the binary
    let wide = Subsystem::new(&triple().0, vec![0, 2]).unwrap();
    assert!(matches!(
        leapfrog(&mut sys, &wide, 1.0, 0.1, &quiet()),
        Err(SimError::InvalidSubsystem(_))
    ));

    assert_eq!(sys.time(), 0.0);
    assert_eq!(sys.bodies()[0].q, q0);
}

#[test]
fn near_coincidence_fails_instead_of_returning_nan_series() {
    // close enough that |r|^3 underflows and the force overflows
    let near_pair = || {
        let b1 = Body::new(1.0, [-5e-151, 0.0, 0.0].into(), NVec3::zeros());
        let b2 = Body::new(1.0, [5e-151, 0.0, 0.0].into(), NVec3::zeros());
        System::new(vec![b1, b2], 1.0).unwrap()
    };

    for kind in [IntegratorKind::Leapfrog, IntegratorKind::Hermite] {
        let mut sys = near_pair();
        let reference = Subsystem::all(&sys);
        let params = Parameters::new(1.0, 0.1);

        let result = integrate(kind, &mut sys, &reference, &params, &RunOptions::default());
        assert!(
            matches!(result, Err(SimError::NonFiniteState { .. })),
            "{kind}: {result:?}"
        );
        assert!(sys.check_finite().is_err());
    }
}

#[test]
fn singular_run_fails_instead_of_returning_series() {
    let mut sys = two_body_system(0.0, 1.0, 1.0);
    let reference = Subsystem::all(&sys);

    let result = hermite(&mut sys, &reference, 1.0, 0.1, &RunOptions::default());
    assert!(matches!(result, Err(SimError::Singularity { i: 0, j: 1, .. })));
}

#[test]
fn engine_runs_configured_integrator() {
    let (mut sys, reference, period) = circular_binary();
    let engine = Engine::new(IntegratorKind::Hermite).with_options(quiet());

    let params = Parameters::new(period, period / 100.0);
    let outcome = engine.run(&mut sys, &reference, &params).unwrap();
    assert_eq!(outcome.integrator, IntegratorKind::Hermite);
    assert_eq!(outcome.steps_taken, 100);
}

// ==================================================================================
// Sweep tests
// ==================================================================================

#[test]
fn sweep_keeps_order_and_leaves_input_untouched() {
    let (sys, reference, period) = circular_binary();
    let q0 = sys.bodies()[1].q;
    let steps = [period / 50.0, period / 100.0, period / 200.0];
    let engine = Engine::new(IntegratorKind::Leapfrog);

    let runs = sweep(&engine, &sys, &reference, period, &steps);

    assert_eq!(runs.len(), 3);
    for (run, &h) in runs.iter().zip(&steps) {
        assert_eq!(run.h, h);
        let outcome = run.outcome.as_ref().unwrap();
        assert_eq!(outcome.h, h);
        assert_eq!(outcome.final_time, period);
    }
    assert_eq!(sys.bodies()[1].q, q0);
    assert_eq!(sys.time(), 0.0);
}

#[test]
fn sweep_isolates_failed_run() {
    let (sys, reference, period) = circular_binary();
    let engine = Engine::new(IntegratorKind::Hermite);

    let runs = sweep(&engine, &sys, &reference, period, &[period / 100.0, -1.0, period / 200.0]);

    assert!(runs[0].outcome.is_ok());
    assert!(matches!(runs[1].outcome, Err(SimError::InvalidStep(_))));
    assert!(runs[2].outcome.is_ok());
}

// ==================================================================================
// Scenario, config and report tests
// ==================================================================================

const TRIPLE_YAML: &str = r#"
engine:
  integrator: "herm"
  record_every: 5
  plot:
    snapshot_name: "3bodies_hermite"

parameters:
  units: "astronomical"
  duration: 1.0
  steps: [0.01, 0.02]

initial:
  triple:
    masses: [1.0, 1.0, 0.1]
    sma: [2.0, 7.0]
    ecc: [0.0, 0.1]
    inclination: 80.0
"#;

#[test]
fn scenario_builds_from_yaml() {
    let cfg: ScenarioConfig = serde_yaml::from_str(TRIPLE_YAML).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.engine.integrator, IntegratorKind::Hermite);
    assert_eq!(scenario.engine.options.record_every, 5);
    assert!(scenario.engine.options.recover_params);
    assert!(scenario.engine.options.record_positions);
    assert_eq!(scenario.engine.options.plot.snapshot_name, "3bodies_hermite");
    assert_eq!(scenario.system.len(), 3);
    assert_eq!(scenario.reference.members(), &[0, 1]);
    assert_eq!(scenario.system.G(), G_ASTRO);
    assert!(scenario.system.view().momentum().norm() < 1e-12);
}

#[test]
fn scenario_rejects_ambiguous_or_malformed_input() {
    let both = TRIPLE_YAML.replace(
        "initial:\n",
        "initial:\n  binary:\n    masses: [1.0, 1.0]\n    sma: 1.0\n    ecc: 0.0\n",
    );
    let cfg: ScenarioConfig = serde_yaml::from_str(&both).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::InvalidScenario(_))));

    let flat = r#"
engine:
  integrator: "leapfrog"
parameters:
  duration: 1.0
  steps: [0.1]
initial:
  bodies:
    - m: 1.0
      x: [0.0, 0.0]
      v: [0.0, 0.0, 0.0]
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(flat).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::InvalidScenario(_))));

    let bad_step = TRIPLE_YAML.replace("[0.01, 0.02]", "[0.01, 0.0]");
    let cfg: ScenarioConfig = serde_yaml::from_str(&bad_step).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::InvalidStep(_))));
}

#[test]
fn report_marks_failed_runs() {
    let cfg: ScenarioConfig = serde_yaml::from_str(TRIPLE_YAML).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    let mut runs = sweep(
        &scenario.engine,
        &scenario.system,
        &scenario.reference,
        scenario.duration,
        &scenario.steps,
    );
    runs.push(SweepRun {
        h: 0.5,
        outcome: Err(SimError::Singularity { i: 0, j: 1, time: 0.5 }),
        system: scenario.system.clone(),
    });

    let report = RunReport::new(&scenario, &runs);
    assert_eq!(report.completed(), 2);
    assert_eq!(report.runs[0].series.as_ref().unwrap().len(), 21);

    let failed: &RunRecord = &report.runs[2];
    assert_eq!(failed.status, RunStatus::Failed);
    assert!(failed.series.is_none());
    assert!(failed.error.as_ref().unwrap().contains("coincide"));

    let yaml = report.to_yaml().unwrap();
    assert!(yaml.contains("completed"));
    assert!(yaml.contains("failed"));
}

#[test]
fn integrator_names_parse() {
    assert_eq!("frog".parse::<IntegratorKind>().unwrap(), IntegratorKind::Leapfrog);
    assert_eq!("Hermite".parse::<IntegratorKind>().unwrap(), IntegratorKind::Hermite);
    assert!("rk4".parse::<IntegratorKind>().is_err());
    assert_eq!(IntegratorKind::Leapfrog.order(), 2);
    assert_eq!(IntegratorKind::Hermite.order(), 4);
    assert_eq!(IntegratorKind::Hermite.to_string(), "hermite");
}

#[test]
fn unit_systems_agree_on_one_year() {
    assert_relative_eq!(orbital_period(1.0, 1.0, G_ASTRO), 1.0, max_relative = 1e-12);
    assert_relative_eq!(orbital_period(AU, SOLAR_MASS, G_SI), YEAR, max_relative = 1e-3);

    for units in [UnitSystem::Si, UnitSystem::Astronomical] {
        let period = orbital_period(units.au(), units.solar_mass(), units.gravitational_constant());
        assert_relative_eq!(period, units.year(), max_relative = 1e-3);
    }
}
