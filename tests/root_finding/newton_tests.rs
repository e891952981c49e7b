use approx::assert_relative_eq;
use numroot::root_finding::errors::RootFindingError;
use numroot::root_finding::newton::{newton, newton_from, NewtonCfg, NewtonError};
use numroot::root_finding::report::{TerminationReason, ToleranceSatisfied};

type TestResult = Result<(), NewtonError>;

#[test]
fn finds_sqrt_2() -> TestResult {
    let f   = |x: f64| x * x - 2.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;

    let cfg = NewtonCfg::new()
        .set_epsilon(1e-6)?
        .set_max_iter(100)?;

    let res = newton(f, df, ddf, 0.0, 2.0, cfg)?;

    assert_eq!(res.termination_reason, TerminationReason::ToleranceReached);
    assert_eq!(res.tolerance_satisfied, ToleranceSatisfied::AbsFxReached);
    assert_eq!(res.iterations, 4);
    assert_relative_eq!(res.root, 1.4142135623746899, max_relative = 1e-12);
    assert_eq!(res.algorithm_name, "newton");
    let s = res.stencil.stencil();
    assert_eq!(s.len(), 1);
    Ok(())
}

#[test]
fn starts_from_endpoint_satisfying_fourier_condition() -> TestResult {
    // f(0) * f''(0) < 0, f(2) * f''(2) > 0: iteration starts at b = 2
    let f   = |x: f64| x * x - 2.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;
    let cfg = NewtonCfg::new().set_epsilon(1e-6)?.set_max_iter(100)?;

    let from_interval = newton(f, df, ddf, 0.0, 2.0, cfg)?;
    let from_b        = newton_from(f, df, 2.0, cfg)?;

    assert_eq!(from_interval.root, from_b.root);
    assert_eq!(from_interval.iterations, from_b.iterations);
    Ok(())
}

#[test]
fn falls_back_to_a_without_fourier_endpoint() -> TestResult {
    // f'' == 0 everywhere: neither endpoint qualifies, start at a
    let f   = |x: f64| 2.0 * x - 6.0;
    let df  = |_x: f64| 2.0;
    let ddf = |_x: f64| 0.0;
    let cfg = NewtonCfg::new().set_epsilon(1e-12)?;

    let res = newton(f, df, ddf, 0.0, 10.0, cfg)?;

    assert_eq!(res.solution(), Some((3.0, 1)));
    assert_eq!(res.stencil.stencil(), &[0.0]);
    Ok(())
}

#[test]
fn start_point_is_root_iterations_0() -> TestResult {
    let f   = |x: f64| x - 1.0;
    let df  = |_x: f64| 1.0;
    let cfg = NewtonCfg::new().set_epsilon(1e-20)?;

    let res = newton_from(f, df, 1.0, cfg)?;
    assert_eq!(res.iterations, 0);
    assert_eq!(res.evaluations, 1);
    assert_eq!(res.termination_reason, TerminationReason::ToleranceReached);
    assert_eq!(res.stencil.stencil(), &[1.0]);
    Ok(())
}

#[test]
fn step_size_tolerance_on_first_iteration() -> TestResult {
    let f  = |x: f64| 1e9 * ((x - 1.0) + 1e-6 * (x - 1.0).powi(2));
    let df = |x: f64| 1e9 * (1.0 + 2e-6 * (x - 1.0));

    let cfg = NewtonCfg::new()
        .set_epsilon(0.15)?
        .set_max_iter(5)?;

    let res = newton_from(f, df, 1.1, cfg)?;
    assert_eq!(res.termination_reason, TerminationReason::ToleranceReached);
    assert_eq!(res.tolerance_satisfied, ToleranceSatisfied::StepSizeReached);
    assert_eq!(res.iterations, 1);
    assert_eq!(res.stencil.stencil(), &[1.1]);
    Ok(())
}

#[test]
fn machine_precision_stagnation_triggers() -> TestResult {
    let f  = |_x: f64| -1.0;
    let df = |_x: f64|  1.0;

    let cfg = NewtonCfg::new()
        .set_epsilon(1e-300)?
        .set_max_iter(10)?;

    let res = newton_from(f, df, 1.0e308, cfg)?;
    assert_eq!(res.termination_reason, TerminationReason::MachinePrecisionReached);
    assert_eq!(res.tolerance_satisfied, ToleranceSatisfied::StepSizeReached);
    assert_eq!(res.iterations, 1);
    assert_eq!(res.solution(), None);
    Ok(())
}

#[test]
fn hits_iteration_limit() -> TestResult {
    let f   = |x: f64| x * x - 2.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;
    let cfg = NewtonCfg::new()
        .set_epsilon(1e-6)?
        .set_max_iter(2)?;

    let res = newton(f, df, ddf, 0.0, 2.0, cfg)?;

    assert_eq!(res.termination_reason, TerminationReason::IterationLimit);
    assert_eq!(res.iterations, 2);
    assert_relative_eq!(res.root, 1.4166666666666667, max_relative = 1e-12);
    assert_eq!(res.stencil.stencil(), &[1.5]);
    Ok(())
}

#[test]
fn zero_epsilon_is_bounded_by_max_iter() -> TestResult {
    let f   = |x: f64| x * x - 2.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;
    let cfg = NewtonCfg::new()
        .set_epsilon(0.0)?
        .set_max_iter(60)?;

    let res = newton(f, df, ddf, 0.0, 2.0, cfg)?;

    assert_ne!(res.termination_reason, TerminationReason::ToleranceReached);
    assert!(res.iterations <= 60);
    assert_relative_eq!(res.root, 2.0_f64.sqrt(), max_relative = 1e-15);
    Ok(())
}

#[test]
fn zero_derivative_is_reported() -> TestResult {
    let f   = |x: f64| x * x - 1.0;
    let df  = |x: f64| 2.0 * x;
    let cfg = NewtonCfg::new();

    let err = newton_from(f, df, 0.0, cfg).unwrap_err();
    assert_eq!(err, NewtonError::DerivativeTooSmall { x: 0.0, dfx: 0.0 });
    Ok(())
}

#[test]
fn non_finite_derivative_is_reported() {
    let f   = |x: f64| x.cbrt() - 1.0;
    let df  = |x: f64| 1.0 / (3.0 * x.cbrt() * x.cbrt());
    let err = newton_from(f, df, 0.0, NewtonCfg::new()).unwrap_err();

    assert!(matches!(err, NewtonError::DerivativeNotFinite { x, dfx } if x == 0.0 && dfx.is_infinite()));
}

#[test]
fn non_finite_curvature_is_reported() {
    let f   = |x: f64| x - 0.5;
    let df  = |_x: f64| 1.0;
    let ddf = |x: f64| if x == 0.0 { f64::NAN } else { 0.0 };
    let err = newton(f, df, ddf, 0.0, 1.0, NewtonCfg::new()).unwrap_err();

    assert!(matches!(err, NewtonError::CurvatureNotFinite { x, .. } if x == 0.0));
}

#[test]
fn non_finite_function_is_reported() {
    let f   = |x: f64| (x - 3.0).sqrt();
    let df  = |x: f64| 0.5 / (x - 3.0).sqrt();
    let err = newton_from(f, df, 1.0, NewtonCfg::new()).unwrap_err();

    assert!(matches!(
        err,
        NewtonError::RootFinding(RootFindingError::NonFiniteEvaluation { x, fx })
        if x == 1.0 && fx.is_nan()));
}

#[test]
fn invalid_inputs() {
    let f   = |x: f64| x;
    let df  = |_x: f64| 1.0;
    let ddf = |_x: f64| 0.0;

    let err = newton(f, df, ddf, 1.0, 0.0, NewtonCfg::new()).unwrap_err();
    assert_eq!(err, NewtonError::InvalidBounds { a: 1.0, b: 0.0 });

    let err = newton_from(f, df, f64::NAN, NewtonCfg::new()).unwrap_err();
    assert!(matches!(err, NewtonError::InvalidGuess { x0 } if x0.is_nan()));
}

#[test]
fn wikipedia_trigonometry() -> TestResult {
    let f   = |x: f64| x.cos() - x * x * x;
    let df  = |x: f64| -x.sin() - 3.0 * x * x;
    let ddf = |x: f64| -x.cos() - 6.0 * x;
    let cfg = NewtonCfg::new().set_epsilon(1e-12)?;

    let res = newton(f, df, ddf, 0.0, 1.0, cfg)?;
    assert!(res.is_converged());
    assert_relative_eq!(res.root, 0.865474033102, max_relative = 1e-11);
    Ok(())
}

#[test]
fn endpoint_a_is_root_iterations_0() -> TestResult {
    let f   = |x: f64| x * x - 1.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;
    let cfg = NewtonCfg::new().set_epsilon(1e-12)?;

    let res = newton(f, df, ddf, 1.0, 3.0, cfg)?;

    assert_eq!(res.solution(), Some((1.0, 0)));
    assert_eq!(res.evaluations, 1);
    assert_eq!(res.tolerance_satisfied, ToleranceSatisfied::AbsFxReached);
    assert_eq!(res.stencil.stencil(), &[1.0]);
    Ok(())
}

#[test]
fn endpoint_b_is_root_iterations_0() -> TestResult {
    // f(1) * f''(1) < 0, so b is reached and taken before f''(b)
    let f   = |x: f64| x * x - 9.0;
    let df  = |x: f64| 2.0 * x;
    let ddf = |_x: f64| 2.0;
    let cfg = NewtonCfg::new().set_epsilon(1e-12)?;

    let res = newton(f, df, ddf, 1.0, 3.0, cfg)?;

    assert_eq!(res.solution(), Some((3.0, 0)));
    assert_eq!(res.evaluations, 3);
    Ok(())
}
