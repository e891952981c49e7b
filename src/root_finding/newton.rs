//! Newton-Raphson method

use super::algorithms::{Algorithm, OpenFamily, GLOBAL_MAX_ITER_FALLBACK};
use super::report::{RootFindingReport, TerminationReason, ToleranceSatisfied, Stencil};
use super::errors::{RootFindingError, ToleranceError};
use super::config::{CommonCfg, impl_common_cfg};
use super::signs::strictly_same_sign;
use log::debug;
use thiserror::Error;


#[derive(Debug, Error, PartialEq)]
pub enum NewtonError {
    #[error(transparent)]
    RootFinding(#[from] RootFindingError),

    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    #[error("invalid initial guess: x0={x0} must be finite")]
    InvalidGuess { x0: f64 },

    #[error("invalid bounds: a and b must be finite with a < b. got [{a}, {b}]")]
    InvalidBounds { a: f64, b: f64 },

    #[error("step non-finite from vanishing derivative at x={x}, f'(x)={dfx}")]
    DerivativeTooSmall { x: f64, dfx: f64 },

    #[error("derivative non-finite at x={x}, f'(x)={dfx}")]
    DerivativeNotFinite { x: f64, dfx: f64 },

    #[error("second derivative non-finite at x={x}, f''(x)={ddfx}")]
    CurvatureNotFinite { x: f64, ddfx: f64 },
}


/// Newton configuration.
///
/// # Fields
/// - `common` : [`CommonCfg`] with `epsilon` and optional `max_iter`.
///
/// # Defaults
/// - If `common.max_iter` is `None`, [`newton`] resolves it using
///   [`Algorithm::default_max_iter`] for [`OpenFamily::Newton`], or
///   [`GLOBAL_MAX_ITER_FALLBACK`] if unavailable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NewtonCfg {
    common: CommonCfg,
}
impl NewtonCfg {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CommonCfg::new(),
        }
    }
}
impl_common_cfg!(NewtonCfg);


/// Helpers
/// - `eval_fx_checked`  : evaluates `f(x)` with finite-check
/// - `eval_dfx_checked` : evaluates user-supplied derivative `df(x)`
/// - `eval_ddfx_checked`: evaluates user-supplied second derivative `ddf(x)`
#[inline]
fn eval_fx_checked<F>(
    f: &mut F,
    x: f64,
    evals: &mut usize
) -> Result<f64, NewtonError>  where F: FnMut(f64) -> f64 {
    let fx = { *evals += 1; f(x) };
    if !fx.is_finite() {
        return Err(RootFindingError::NonFiniteEvaluation { x, fx }.into());
    }

    Ok(fx)
}
#[inline]
fn eval_dfx_checked<G>(
    df: &mut G,
    x: f64,
    evals: &mut usize
) -> Result<f64, NewtonError> where G: FnMut(f64) -> f64 {
    let dfx = { *evals += 1; df(x) };
    if !dfx.is_finite() {
        return Err(NewtonError::DerivativeNotFinite { x, dfx });
    }

    Ok(dfx)
}
#[inline]
fn eval_ddfx_checked<H>(
    ddf: &mut H,
    x: f64,
    evals: &mut usize
) -> Result<f64, NewtonError> where H: FnMut(f64) -> f64 {
    let ddfx = { *evals += 1; ddf(x) };
    if !ddfx.is_finite() {
        return Err(NewtonError::CurvatureNotFinite { x, ddfx });
    }

    Ok(ddfx)
}


/// Picks the starting endpoint of `[a, b]` by the Fourier condition
/// `f(x) * f''(x) > 0`, under which Newton iterates approach a simple root
/// monotonically. Falls back to `a` when neither endpoint qualifies.
///
/// An endpoint with `|f| <= epsilon` is taken as is, before `f''` is evaluated
/// there.
///
/// Returns `(x0, f(x0))` so the first residual is not evaluated twice.
fn initial_guess<F, H>(
    f: &mut F,
    ddf: &mut H,
    a: f64,
    b: f64,
    epsilon: f64,
    evals: &mut usize
) -> Result<(f64, f64), NewtonError>
where
    F: FnMut(f64) -> f64,
    H: FnMut(f64) -> f64
{
    let fa   = eval_fx_checked(f, a, evals)?;
    if fa.abs() <= epsilon {
        return Ok((a, fa));
    }
    let ddfa = eval_ddfx_checked(ddf, a, evals)?;
    if strictly_same_sign(fa, ddfa) {
        return Ok((a, fa));
    }

    let fb   = eval_fx_checked(f, b, evals)?;
    if fb.abs() <= epsilon {
        return Ok((b, fb));
    }
    let ddfb = eval_ddfx_checked(ddf, b, evals)?;
    if strictly_same_sign(fb, ddfb) {
        return Ok((b, fb));
    }

    debug!("newton: no endpoint of [{a}, {b}] satisfies f*f'' > 0, starting from a");
    Ok((a, fa))
}


fn newton_loop<F, G>(
    mut f: F,
    mut df: G,
    x0: f64,
    fx0: f64,
    mut evals: usize,
    cfg: NewtonCfg,
) -> Result<RootFindingReport, NewtonError>
where
    F: FnMut(f64) -> f64,
    G: FnMut(f64) -> f64
{
    let algorithm = Algorithm::Open(OpenFamily::Newton);
    let algo_name = algorithm.algorithm_name();

    let epsilon   = cfg.epsilon();
    let num_iter  = match cfg.max_iter() {
        Some(v) => v,
        None    => algorithm
            .default_max_iter()
            .unwrap_or(GLOBAL_MAX_ITER_FALLBACK)
    };

    // early exit: x0 is root
    let mut x  = x0;
    let mut fx = fx0;
    if fx.abs() <= epsilon {
        return Ok(RootFindingReport {
            root                : x0,
            f_root              : fx,
            iterations          : 0,
            evaluations         : evals,
            termination_reason  : TerminationReason::ToleranceReached,
            tolerance_satisfied : ToleranceSatisfied::AbsFxReached,
            stencil             : Stencil::singleton(x0), // equal to root; see docs
            algorithm_name      : algo_name,
        });
    }

    // main loop
    let mut prev_x = x;
    for iter in 1..=num_iter {
        let dfx = eval_dfx_checked(&mut df, x, &mut evals)?;

        let step = -fx / dfx;
        if !step.is_finite() {
            return Err(NewtonError::DerivativeTooSmall { x, dfx });
        }

        let x_next = x + step;

        // machine stagnation
        if x_next == x {
            debug!("newton: stagnated at x={x} after {iter} iterations");
            return Ok(RootFindingReport {
                root                : x,
                f_root              : fx,
                iterations          : iter,
                evaluations         : evals,
                termination_reason  : TerminationReason::MachinePrecisionReached,
                tolerance_satisfied : ToleranceSatisfied::StepSizeReached,
                stencil             : Stencil::singleton(x), // same as root; see docs
                algorithm_name      : algo_name
            });
        }

        let fx_next = eval_fx_checked(&mut f, x_next, &mut evals)?;
        debug!("newton: iter={iter} x={x_next} f(x)={fx_next} f'(x_prev)={dfx}");

        let tolerance = if fx_next.abs() <= epsilon {
            Some(ToleranceSatisfied::AbsFxReached)
        } else if (x_next - x).abs() <= epsilon {
            Some(ToleranceSatisfied::StepSizeReached)
        } else {
            None
        };

        if let Some(tolerance_satisfied) = tolerance {
            return Ok(RootFindingReport {
                root                : x_next,
                f_root              : fx_next,
                iterations          : iter,
                evaluations         : evals,
                termination_reason  : TerminationReason::ToleranceReached,
                tolerance_satisfied,
                stencil             : Stencil::singleton(x), // previous iterate; see docs
                algorithm_name      : algo_name,
            });
        }

        prev_x = x;
        x  = x_next;
        fx = fx_next;
    }

    debug!("newton: iteration limit {num_iter} reached at x={x}");
    Ok(RootFindingReport {
        root                : x,
        f_root              : fx,
        iterations          : num_iter,
        evaluations         : evals,
        termination_reason  : TerminationReason::IterationLimit,
        tolerance_satisfied : ToleranceSatisfied::ToleranceNotReached,
        stencil             : Stencil::singleton(prev_x), // previous iterate; see docs
        algorithm_name      : algo_name,
    })
}


/// Finds a root of `func` in `[a, b]` using the
/// [Newton–Raphson method](https://en.wikipedia.org/wiki/Newton_method).
///
/// The second derivative only selects the starting point: the endpoint
/// where `f(x) * f''(x) > 0` (`a` first, then `b`, else `a`). The update
/// itself is the plain Newton step.
///
/// # Arguments
/// - `func`   : function whose root is sought
/// - `dfunc`  : first derivative
/// - `ddfunc` : second derivative
/// - `a`, `b` : finite interval with `a < b`
/// - `cfg`    : [`NewtonCfg`] (`epsilon`, optional `max_iter`)
///
/// # Returns
/// [`RootFindingReport`] with:
/// - `root`                : approximate root
/// - `f_root`              : function value at `root`
/// - `iterations`          : Newton steps taken, counted from 1
/// - `evaluations`         : total evaluations (f, f' and f'')
/// - `termination_reason`  : why it stopped
/// - `tolerance_satisfied` : which tolerance triggered
/// - `stencil`             : previous iterate used to form the step
/// - `algorithm_name`      : "newton"
///
/// # Errors
/// - [`NewtonError::InvalidBounds`]       : `a`/`b` non-finite or `a >= b`
/// - [`NewtonError::DerivativeTooSmall`]  : `-f(x)/f'(x)` is not finite
/// - [`NewtonError::DerivativeNotFinite`] : `f'(x)` is NaN/inf
/// - [`NewtonError::CurvatureNotFinite`]  : `f''` is NaN/inf at an endpoint
///
/// * Propagated via [`NewtonError::RootFinding`]:
/// - [`RootFindingError::NonFiniteEvaluation`] : `f(x)` produced NaN/inf
///
/// # Behavior
/// - Stop, in order:
///     - x_{k+1} == x_k              : [`TerminationReason::MachinePrecisionReached`]
///     - |f(x_{k+1})| <= epsilon     : [`ToleranceSatisfied::AbsFxReached`]
///     - |x_{k+1} - x_k| <= epsilon  : [`ToleranceSatisfied::StepSizeReached`]
/// - Stagnation:
///     reported as `MachinePrecisionReached` paired with `StepSizeReached`,
///     and it is *not* convergence: [`RootFindingReport::solution`] is `None`
///     even when `epsilon == 0` and the zero step meets the step test.
///     `root` is the last iterate `x_k`, with `f_root = f(x_k)`.
/// - Report:
///     `stencil` is the previous iterate used to form the last step; on
///     immediate success at `x0`, it equals `x0`; on iteration limit, it is the
///     iterate before the last; on machine stagnation it equals the root.
///
/// # Notes
/// - Convergence is *local only*. The iterates are not confined to `[a, b]`.
///   For guaranteed convergence, use [`super::bisection::bisection`].
pub fn newton<F, G, H>(
    mut func: F,
    dfunc: G,
    mut ddfunc: H,
    a: f64,
    b: f64,
    cfg: NewtonCfg,
) -> Result<RootFindingReport, NewtonError>
where
    F: FnMut(f64) -> f64,
    G: FnMut(f64) -> f64,
    H: FnMut(f64) -> f64 {

    if !(a.is_finite() && b.is_finite()) || a >= b {
        return Err(NewtonError::InvalidBounds { a, b });
    }

    let mut evals: usize = 0;
    let (x0, fx0) = initial_guess(&mut func, &mut ddfunc, a, b, cfg.epsilon(), &mut evals)?;
    debug!("newton: starting from x0={x0} on [{a}, {b}]");

    newton_loop(func, dfunc, x0, fx0, evals, cfg)
}


/// Newton iteration from an explicit starting point `x0`.
///
/// Same loop, stopping rules and report as [`newton`], without the
/// interval and second derivative.
///
/// # Errors
/// - [`NewtonError::InvalidGuess`] : `x0` non-finite
/// - otherwise as [`newton`]
pub fn newton_from<F, G>(
    mut func: F,
    dfunc: G,
    x0: f64,
    cfg: NewtonCfg,
) -> Result<RootFindingReport, NewtonError>
where
    F: FnMut(f64) -> f64,
    G: FnMut(f64) -> f64 {

    if !x0.is_finite() {
        return Err(NewtonError::InvalidGuess { x0 });
    }

    let mut evals: usize = 0;
    let fx0 = eval_fx_checked(&mut func, x0, &mut evals)?;

    newton_loop(func, dfunc, x0, fx0, evals, cfg)
}
