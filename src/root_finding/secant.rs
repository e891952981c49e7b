use super::algorithms::{Algorithm, OpenFamily, GLOBAL_MAX_ITER_FALLBACK};
use super::report::{RootFindingReport, TerminationReason, ToleranceSatisfied, Stencil};
use super::errors::{RootFindingError, ToleranceError};
use super::config::{CommonCfg, impl_common_cfg};
use log::debug;
use thiserror::Error;


#[derive(Debug, Error, PartialEq)]
pub enum SecantError{
    #[error(transparent)]
    RootFinding(#[from] RootFindingError),

    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    #[error("invalid initial guesses: x0 and x1 must be finite and distinct. got {x0}, {x1}")]
    InvalidGuess { x0: f64, x1: f64 },

    #[error("degenerate secant through x0={x0}, x1={x1}: f(x1) - f(x0) vanishes")]
    DegenerateSecantStep { x0: f64, x1: f64 },
}


/// Secant configuration
///
/// # Fields
/// - `common` : [`CommonCfg`] with `epsilon` and optional `max_iter`.
///
/// # Construction
/// - Use [`SecantCfg::new`] then optional setters.
///
/// # Defaults
/// - If `common.max_iter` is `None`, [`secant`] resolves it using
///   [`Algorithm::default_max_iter`] for [`OpenFamily::Secant`], or
///   [`GLOBAL_MAX_ITER_FALLBACK`] if unavailable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SecantCfg {
    common: CommonCfg,
}
impl SecantCfg {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CommonCfg::new()
        }
    }
}
impl_common_cfg!(SecantCfg);


/// Calculates the secant x-intercept for the line
/// connecting `(x0, fx0)` and `(x1, fx1)`, stepping from `x1`.
///
/// # Returns
/// - `Ok(x2)` with `x2 = x1 - f(x1) * (x1 - x0) / (f(x1) - f(x0))`
/// - `Err(DegenerateSecantStep)` if the line is flat or the step is non-finite
#[inline]
fn secant_step(
    (x0, fx0): (f64, f64),
    (x1, fx1): (f64, f64),
) -> Result<f64, SecantError> {
    let denom = fx1 - fx0;
    if denom == 0.0 {
        return Err(SecantError::DegenerateSecantStep { x0, x1 });
    }

    let x2 = x1 - fx1 * (x1 - x0) / denom;
    if !x2.is_finite() {
        return Err(SecantError::DegenerateSecantStep { x0, x1 });
    }

    Ok(x2)
}

#[inline]
fn eval_checked<F>(
    f: &mut F,
    x: f64,
    evals: &mut usize
) -> Result<f64, SecantError> where F: FnMut(f64) -> f64 {
    let fx = { *evals += 1; f(x) };
    if !fx.is_finite() {
        return Err(RootFindingError::NonFiniteEvaluation { x, fx }.into());
    }

    Ok(fx)
}


/// Finds a root of a function using the
/// [secant method](https://en.wikipedia.org/wiki/Secant_method).
///
/// # Arguments
/// - `func` : The function whose root is to be found
/// - `x0`   : First initial guess.  Must be finite and not equal to `x1`
/// - `x1`   : Second initial guess. Must be finite and not equal to `x0`
/// - `cfg`  : [`SecantCfg`] (`epsilon`, optional `max_iter`)
///
/// # Returns
/// [`RootFindingReport`] with
/// - `root`                : approximate root
/// - `f_root`              : function value at `root`
/// - `iterations`          : secant steps taken, counted from 1
/// - `evaluations`         : total function evaluations
/// - `termination_reason`  : why it stopped
/// - `tolerance_satisfied` : which tolerance triggered
/// - `stencil`             : `{x_k, x_{k-1}}` that formed the last step
/// - `algorithm_name`      : "secant"
///
/// # Errors
/// - [`SecantError::InvalidGuess`]             : `x0` or `x1` is NaN/inf or equal
/// - [`SecantError::DegenerateSecantStep`]     : `f(x_k) == f(x_{k-1})`, or the step overflows
///
/// * Propagated via [`SecantError::RootFinding`]
/// - [`RootFindingError::NonFiniteEvaluation`] : `f(x)` produced NaN/inf
///
/// # Behavior
/// - Update:
///     x_{k+1} = x_k - f(x_k) * (x_k - x_{k-1}) / (f(x_k) - f(x_{k-1}))
/// - Stop, in order:
///     - x_{k+1} == x_k               : [`TerminationReason::MachinePrecisionReached`]
///     - |f(x_{k+1})| <= epsilon      : [`ToleranceSatisfied::AbsFxReached`]
///     - |x_{k+1} - x_k| <= epsilon   : [`ToleranceSatisfied::StepSizeReached`]
/// - Stagnation:
///     reported as `MachinePrecisionReached` paired with `StepSizeReached`,
///     and it is *not* convergence: [`RootFindingReport::solution`] is `None`
///     even when `epsilon == 0` and the zero step meets the step test.
///
/// # Warning
/// - Poor initial guesses may lead to divergence or extremely slow convergence.
///   For guaranteed convergence, use [`super::bisection::bisection`].
pub fn secant<F> (
    mut func: F,
    x0: f64,
    x1: f64,
    cfg: SecantCfg
) -> Result<RootFindingReport, SecantError>
where F: FnMut(f64) -> f64 {

    if !(x0.is_finite() && x1.is_finite()) || x0 == x1 {
        return Err(SecantError::InvalidGuess { x0, x1 });
    }

    let epsilon    = cfg.epsilon();
    let algorithm  = Algorithm::Open(OpenFamily::Secant);
    let algo_name  = algorithm.algorithm_name();

    let num_iter = match cfg.max_iter() {
        Some(v) => v,
        None    => algorithm.default_max_iter().unwrap_or(GLOBAL_MAX_ITER_FALLBACK),
    };

    // track function evaluations
    let mut evals = 0;

    // early exit: x0 is root
    let fx0 = eval_checked(&mut func, x0, &mut evals)?;
    if fx0.abs() <= epsilon {
        return Ok(RootFindingReport {
            root                : x0,
            f_root              : fx0,
            iterations          : 0,
            evaluations         : evals,
            termination_reason  : TerminationReason::ToleranceReached,
            tolerance_satisfied : ToleranceSatisfied::AbsFxReached,
            stencil             : Stencil::singleton(x0),
            algorithm_name      : algo_name
        });
    }
    // early exit: x1 is root
    let fx1 = eval_checked(&mut func, x1, &mut evals)?;
    if fx1.abs() <= epsilon {
        return Ok(RootFindingReport {
            root                : x1,
            f_root              : fx1,
            iterations          : 0,
            evaluations         : evals,
            termination_reason  : TerminationReason::ToleranceReached,
            tolerance_satisfied : ToleranceSatisfied::AbsFxReached,
            stencil             : Stencil::singleton(x1),
            algorithm_name      : algo_name
        });
    }

    // main loop
    let mut x_parent1 = x1;
    let mut x_parent2 = x0;
    let mut f_parent1 = fx1;
    let mut f_parent2 = fx0;
    for iter in 1..=num_iter {
        let x_next = secant_step((x_parent2, f_parent2), (x_parent1, f_parent1))?;

        // machine stagnation
        if x_next == x_parent1 {
            debug!("secant: stagnated at x={x_next} after {iter} iterations");
            return Ok(RootFindingReport {
                root                : x_parent1,
                f_root              : f_parent1,
                iterations          : iter,
                evaluations         : evals,
                termination_reason  : TerminationReason::MachinePrecisionReached,
                tolerance_satisfied : ToleranceSatisfied::StepSizeReached,
                stencil             : Stencil::doubleton(x_parent1, x_parent2),
                algorithm_name      : algo_name
            });
        }

        let f_next = eval_checked(&mut func, x_next, &mut evals)?;
        debug!("secant: iter={iter} x={x_next} f(x)={f_next}");

        let tolerance = if f_next.abs() <= epsilon {
            Some(ToleranceSatisfied::AbsFxReached)
        } else if (x_next - x_parent1).abs() <= epsilon {
            Some(ToleranceSatisfied::StepSizeReached)
        } else {
            None
        };

        if let Some(tolerance_satisfied) = tolerance {
            return Ok(RootFindingReport {
                root                : x_next,
                f_root              : f_next,
                iterations          : iter,
                evaluations         : evals,
                termination_reason  : TerminationReason::ToleranceReached,
                tolerance_satisfied,
                stencil             : Stencil::doubleton(x_parent1, x_parent2),
                algorithm_name      : algo_name
            });
        }

        x_parent2 = x_parent1;
        f_parent2 = f_parent1;
        x_parent1 = x_next;
        f_parent1 = f_next;
    }

    debug!("secant: iteration limit {num_iter} reached at x={x_parent1}");
    Ok(RootFindingReport {
        root                : x_parent1,
        f_root              : f_parent1,
        iterations          : num_iter,
        evaluations         : evals,
        termination_reason  : TerminationReason::IterationLimit,
        tolerance_satisfied : ToleranceSatisfied::ToleranceNotReached,
        stencil             : Stencil::doubleton(x_parent1, x_parent2),
        algorithm_name      : algo_name
    })
}
