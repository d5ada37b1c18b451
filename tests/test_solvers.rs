//! Engine-level solver tests
//!
//! Exercise both integration backends through the public API against
//! known solutions, and check the failure modes of the step loop.

use approx::assert_relative_eq;
use forcing::{solve, Error, Problem, Settings, SolverKind, System};

fn decay_problem(settings: Settings) -> (Problem, forcing::Variable) {
    let mut sys = System::new("decay");
    let y = sys.unknown("y");
    sys.set_default(&y, 1.0);
    {
        let y = y.clone();
        sys.set_rhs(move |_t, s, _p, d| {
            d.set(&y, -s.get(&y));
        });
    }
    let sys = sys.compile(&[]).unwrap();
    let problem = Problem::new(sys, (0.0, 1.0))
        .unwrap()
        .with_settings(settings);
    (problem, y)
}

#[test]
fn test_exponential_decay_rk4() {
    let settings = Settings {
        solver: SolverKind::RK4,
        dt: 0.01,
        ..Settings::default()
    };
    let (problem, y) = decay_problem(settings);
    let sol = solve(&problem, &[]).unwrap();
    assert_relative_eq!(
        sol.value_at(&y, 1.0).unwrap(),
        (-1.0f64).exp(),
        epsilon = 1e-7
    );
}

#[test]
fn test_exponential_decay_rkbs32() {
    let settings = Settings {
        solver: SolverKind::RKBS32,
        ..Settings::default()
    };
    let (problem, y) = decay_problem(settings);
    let sol = solve(&problem, &[]).unwrap();
    assert_relative_eq!(
        sol.value_at(&y, 1.0).unwrap(),
        (-1.0f64).exp(),
        epsilon = 1e-5
    );

    let stats = sol.stats();
    assert!(stats.naccpt > 0);
    assert_eq!(stats.nsteps, stats.naccpt + stats.nrejct);
}

#[test]
fn test_harmonic_oscillator_rkbs32() {
    // y'' = -y as a first order system; y(t) = cos(t)
    let mut sys = System::new("oscillator");
    let pos = sys.unknown("pos");
    let vel = sys.unknown("vel");
    sys.set_default(&pos, 1.0);
    {
        let (pos, vel) = (pos.clone(), vel.clone());
        sys.set_rhs(move |_t, s, _p, d| {
            d.set(&pos, s.get(&vel));
            d.set(&vel, -s.get(&pos));
        });
    }
    let sys = sys.compile(&[]).unwrap();
    let settings = Settings {
        atol: 1e-10,
        rtol: 1e-8,
        ..Settings::default()
    };
    let problem = Problem::new(sys, (0.0, 6.0)).unwrap().with_settings(settings);

    let sol = solve(&problem, &[]).unwrap();
    for &t in &[1.0, 2.5, 4.0, 6.0] {
        assert_relative_eq!(sol.value_at(&pos, t).unwrap(), t.cos(), epsilon = 1e-4);
    }
}

#[test]
fn test_interpolation_between_steps() {
    let settings = Settings {
        solver: SolverKind::RK4,
        dt: 0.1,
        ..Settings::default()
    };
    let (problem, y) = decay_problem(settings);
    let sol = solve(&problem, &[]).unwrap();

    // Query off the step grid: dense output, not nearest-sample
    assert_relative_eq!(
        sol.value_at(&y, 0.123).unwrap(),
        (-0.123f64).exp(),
        epsilon = 1e-6
    );
    assert_eq!(sol.value_at(&y, 1.5), None);
    assert_eq!(sol.value_at(&y, -0.1), None);
}

#[test]
fn test_step_budget_is_enforced() {
    let settings = Settings {
        solver: SolverKind::RK4,
        dt: 1e-4,
        max_steps: 10,
        ..Settings::default()
    };
    let (problem, _y) = decay_problem(settings);
    let err = solve(&problem, &[]).unwrap_err();
    assert!(matches!(err, Error::Solver(_)));
}

#[test]
fn test_initial_value_override() {
    let settings = Settings::default();
    let (problem, y) = decay_problem(settings);
    let problem = problem.with_initial(&y, 2.0).unwrap();
    let sol = solve(&problem, &[]).unwrap();
    assert_relative_eq!(
        sol.value_at(&y, 1.0).unwrap(),
        2.0 * (-1.0f64).exp(),
        epsilon = 1e-5
    );
}
