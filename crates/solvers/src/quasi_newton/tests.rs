use approx::assert_relative_eq;
use ndarray::{Array1, array};

use batchopt_core::{Acquisition, BoundsError, EvalError};

use crate::dispatch::Verbosity;
use crate::error::SolveError;
use crate::objective::ObjectiveFn;

use super::{Config, ConfigError, solve};

/// f(x) = Σ xᵢ², gradient 2x, value reported as a length-1 container.
struct Sphere;

impl Acquisition for Sphere {
    fn dim(&self) -> usize {
        2
    }

    fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
        let value = x.iter().map(|v| v * v).sum::<f64>();
        let grad = x.iter().map(|v| 2.0 * v).collect();
        Ok((array![value], grad))
    }
}

/// The Rosenbrock function for d = 2, minimum at (1, 1).
struct Rosenbrock;

impl Acquisition for Rosenbrock {
    fn dim(&self) -> usize {
        2
    }

    fn value_grad(&self, x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
        let (a, b) = (x[0], x[1]);
        let value = (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2);
        let grad = array![
            -2.0 * (1.0 - a) - 400.0 * a * (b - a * a),
            200.0 * (b - a * a),
        ];
        Ok((array![value], grad))
    }
}

fn wide_bounds(n: usize) -> Vec<(f64, f64)> {
    vec![(-5.0, 5.0); n]
}

#[test]
fn minimizes_sphere_from_interior_point() {
    let sphere = Sphere;
    let objective = ObjectiveFn::new(&sphere);

    let solution = solve(
        &[3.0, 3.0],
        &wide_bounds(2),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap();

    assert!(solution.status.succeeded);
    assert_relative_eq!(solution.x[0], 0.0, epsilon = 1e-5);
    assert_relative_eq!(solution.x[1], 0.0, epsilon = 1e-5);
    assert_relative_eq!(solution.objective, 0.0, epsilon = 1e-8);
    assert_eq!(solution.status.native_code, None);
}

#[test]
fn minimizes_flattened_two_point_batch() {
    // Two independent 2-d points share one flat vector of length 4.
    let sphere = Sphere;
    let objective = ObjectiveFn::new(&sphere);

    let solution = solve(
        &[3.0, 3.0, -4.0, 1.0],
        &wide_bounds(4),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap();

    assert!(solution.status.succeeded);
    for coord in &solution.x {
        assert_relative_eq!(*coord, 0.0, epsilon = 1e-5);
    }
}

#[test]
fn solution_respects_bounds() {
    // The unconstrained minimum (0, 0) lies outside the box [1, 5]².
    let sphere = Sphere;
    let objective = ObjectiveFn::new(&sphere);
    let bounds = vec![(1.0, 5.0), (1.0, 5.0)];

    let solution = solve(
        &[3.0, 3.0],
        &bounds,
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap();

    for (coord, &(lo, hi)) in solution.x.iter().zip(&bounds) {
        assert!(*coord >= lo && *coord <= hi, "coordinate {coord} outside box");
    }
    assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-6);
    assert_relative_eq!(solution.objective, 2.0, epsilon = 1e-8);
}

#[test]
fn initial_point_is_clamped_into_box() {
    let sphere = Sphere;
    let objective = ObjectiveFn::new(&sphere);

    let solution = solve(
        &[10.0, -7.0],
        &wide_bounds(2),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap();

    assert!(solution.status.succeeded);
    assert_relative_eq!(solution.objective, 0.0, epsilon = 1e-8);
}

#[test]
fn converges_on_rosenbrock() {
    let rosenbrock = Rosenbrock;
    let objective = ObjectiveFn::new(&rosenbrock);

    let solution = solve(
        &[-1.2, 1.0],
        &wide_bounds(2),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap();

    assert!(solution.objective < 1e-6, "objective {}", solution.objective);
    assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-2);
    assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-2);
}

#[test]
fn iteration_limit_reports_non_success() {
    let rosenbrock = Rosenbrock;
    let objective = ObjectiveFn::new(&rosenbrock);
    let config = Config::new(1, 10, 1e-12).unwrap();

    let solution = solve(
        &[-1.2, 1.0],
        &wide_bounds(2),
        &objective,
        &config,
        Verbosity::Silent,
    )
    .unwrap();

    assert!(!solution.status.succeeded);
    assert_eq!(solution.status.iterations, 1);
    assert!(solution.status.message.contains("iteration limit"));
}

#[test]
fn bounds_length_mismatch_is_an_error() {
    let sphere = Sphere;
    let objective = ObjectiveFn::new(&sphere);

    let err = solve(
        &[0.0, 0.0],
        &wide_bounds(3),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SolveError::Bounds(BoundsError::Length { given: 3, needed: 2 })
    ));
}

#[test]
fn evaluation_error_propagates_uncaught() {
    #[derive(Debug, thiserror::Error)]
    #[error("model diverged")]
    struct Diverged;

    struct Failing;

    impl Acquisition for Failing {
        fn dim(&self) -> usize {
            1
        }

        fn value_grad(&self, _x: &[f64]) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
            Err(EvalError::Evaluation(Box::new(Diverged)))
        }
    }

    let objective = ObjectiveFn::new(&Failing);
    let err = solve(
        &[0.5],
        &wide_bounds(1),
        &objective,
        &Config::default(),
        Verbosity::Silent,
    )
    .unwrap_err();

    assert!(matches!(err, SolveError::Evaluation(_)));
}

#[test]
fn config_rejects_bad_values() {
    assert_eq!(Config::new(10, 0, 1e-5).unwrap_err(), ConfigError::Memory);
    assert_eq!(Config::new(10, 5, -1.0).unwrap_err(), ConfigError::GradTol);
    assert_eq!(
        Config::default().with_wolfe(0.9, 0.1).unwrap_err(),
        ConfigError::Wolfe
    );
    assert_eq!(
        Config::default().with_initial_step(0.0).unwrap_err(),
        ConfigError::InitialStep
    );
    assert_eq!(
        Config::default().with_obj_tol(f64::NAN).unwrap_err(),
        ConfigError::ObjTol
    );
    assert_eq!(
        Config::default().with_step_tol(-0.5).unwrap_err(),
        ConfigError::StepTol
    );
}
