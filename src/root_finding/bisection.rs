use super::algorithms::{Algorithm, BracketFamily, GLOBAL_MAX_ITER_FALLBACK};
use super::report::{RootFindingReport, TerminationReason, ToleranceSatisfied, Stencil};
use super::errors::{RootFindingError, ToleranceError};
use super::config::{CommonCfg, impl_common_cfg};
use super::signs::opposite_sign;
use log::debug;
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::Bracket(BracketFamily::Bisection);

#[derive(Debug, Error, PartialEq)]
pub enum BisectionError {
    #[error(transparent)]
    RootFinding(#[from] RootFindingError),

    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    #[error("no sign change on [{a}, {b}]: sign(f(a)) = sign(f(b))")]
    NoSignChange  { a: f64, b: f64 },

    #[error("invalid bounds: a and b must be finite with a < b. got [{a}, {b}]")]
    InvalidBounds { a: f64, b: f64 },
}

/// Bisection Configuration
///
/// # Fields
/// - `common` : [`CommonCfg`] with `epsilon` and optional `max_iter`.
///
/// # Construction
/// - Use [`BisectionCfg::new`] then optional setters.
///
/// # Defaults
/// └ If `max_iter` is `None`, [`bisection`] uses [`theoretical_iter`],
///   the number of halvings after which the half-width is <= `epsilon`,
///   capped at [`GLOBAL_MAX_ITER_FALLBACK`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BisectionCfg {
    common: CommonCfg,
}
impl BisectionCfg {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CommonCfg::new()
        }
    }
}
impl_common_cfg!(BisectionCfg);


/// Midpoint of [a, b]. Each end is halved first so `b - a` never overflows.
#[inline]
fn midpoint(a: f64, b: f64) -> f64 {
    a * 0.5 + b * 0.5
}

/// Half-width of [a, b], overflow-free like [`midpoint`].
#[inline]
fn half_width(a: f64, b: f64) -> f64 {
    b * 0.5 - a * 0.5
}

/// Evaluates `f(x)`, counting the call and rejecting NaN/inf.
#[inline]
fn eval_checked<F>(
    f: &mut F,
    x: f64,
    evals: &mut usize
) -> Result<f64, BisectionError> where F: FnMut(f64) -> f64 {
    let fx = { *evals += 1; f(x) };
    if !fx.is_finite() {
        return Err(RootFindingError::NonFiniteEvaluation { x, fx }.into());
    }

    Ok(fx)
}

/// Smallest `k >= 1` such that the half-width at iteration `k`,
/// `(b - a) / 2^k`, is <= `epsilon`.
///
/// Returns `None` when no finite bound exists (`epsilon == 0`).
pub fn theoretical_iter(a: f64, b: f64, epsilon: f64) -> Option<usize> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return None;
    }
    let h0 = half_width(a, b);
    if h0 <= epsilon {
        return Some(1);
    }
    let k = (h0 / epsilon).log2().ceil() + 1.0;
    if !k.is_finite() || k > GLOBAL_MAX_ITER_FALLBACK as f64 {
        return None;
    }
    Some(k as usize)
}


/// Finds a root of a function using the
/// [bisection method](https://en.wikipedia.org/wiki/Bisection_method).
///
/// Assumes `func` is continuous on `[a, b]` and that `func(a)` and `func(b)`
/// have opposite signs, guaranteeing a root exists within the interval.
///
/// # Arguments
///
/// ┌ `func` - The function whose root is to be found.
/// ├ `a`    - Lower bound of the search interval. Must be finite and less than `b`.
/// ├ `b`    - Upper bound of the search interval. Must be finite and greater than `a`.
/// └ `cfg`  - [`BisectionCfg`] (`epsilon`, optional `max_iter`)
///
/// # Returns
///
/// [`RootFindingReport`] with
/// ├ `root`                : last midpoint (or an endpoint that is already a root)
/// ├ `iterations`          : midpoints evaluated, counted from 1; 0 if an endpoint is a root
/// ├ `termination_reason`
/// │  ├ [`TerminationReason::ToleranceReached`]
/// │  └ [`TerminationReason::IterationLimit`]
/// ├ `tolerance_satisfied`
/// │  ├ [`ToleranceSatisfied::AbsFxReached`]     : |f(m)| <= epsilon
/// │  ├ [`ToleranceSatisfied::WidthTolReached`]  : (hi - lo) / 2 <= epsilon
/// │  └ [`ToleranceSatisfied::ToleranceNotReached`]
/// └ `stencil`             : bracket `[lo, hi]` the final midpoint was taken from
///
/// # Errors
///
/// ┌ [`BisectionError::InvalidBounds`] - `a` or `b` is NaN/inf or `a >= b`.
/// ├ [`BisectionError::NoSignChange`]  - `func(a)` and `func(b)` do not have opposite signs.
/// └ [`RootFindingError::NonFiniteEvaluation`] via [`BisectionError::RootFinding`]
///
/// # Notes
/// └ Endpoints are tested against `epsilon` before the sign check, so a
///   root sitting exactly on `a` or `b` is returned rather than rejected.
pub fn bisection<F>(
    mut func: F,
    a: f64,
    b: f64,
    cfg: BisectionCfg
) -> Result<RootFindingReport, BisectionError>
where F: FnMut(f64) -> f64 {

    if !(a.is_finite() && b.is_finite()) || a >= b {
        return Err(BisectionError::InvalidBounds { a, b });
    }

    let epsilon  = cfg.epsilon();
    let num_iter = match cfg.max_iter() {
        Some(m) => m,
        None    => theoretical_iter(a, b, epsilon).unwrap_or(GLOBAL_MAX_ITER_FALLBACK),
    };
    let algo_name = ALGORITHM.algorithm_name();

    // number of function evaluations
    let mut evals = 0;

    // immediate bounds are roots
    let fa = eval_checked(&mut func, a, &mut evals)?;
    if fa.abs() <= epsilon {
        debug!("bisection: endpoint a={a} is a root, f(a)={fa}");
        return Ok(RootFindingReport {
            root                : a,
            f_root              : fa,
            iterations          : 0,
            evaluations         : evals,
            termination_reason  : TerminationReason::ToleranceReached,
            tolerance_satisfied : ToleranceSatisfied::AbsFxReached,
            stencil             : Stencil::bracket(a, b),
            algorithm_name      : algo_name
        });
    }
    let fb = eval_checked(&mut func, b, &mut evals)?;
    if fb.abs() <= epsilon {
        debug!("bisection: endpoint b={b} is a root, f(b)={fb}");
        return Ok(RootFindingReport {
            root                : b,
            f_root              : fb,
            iterations          : 0,
            evaluations         : evals,
            termination_reason  : TerminationReason::ToleranceReached,
            tolerance_satisfied : ToleranceSatisfied::AbsFxReached,
            stencil             : Stencil::bracket(a, b),
            algorithm_name      : algo_name
        });
    }

    if !opposite_sign(fa, fb) {
        return Err(BisectionError::NoSignChange { a, b });
    }

    let mut lo   = a;
    let mut hi   = b;
    let mut f_lo = fa;

    let mut mid  = a;       // gets overwritten
    let mut f_mid = fa;     // gets overwritten
    for iter in 1..=num_iter {
        mid   = midpoint(lo, hi);
        f_mid = eval_checked(&mut func, mid, &mut evals)?;
        debug!("bisection: iter={iter} lo={lo} hi={hi} m={mid} f(m)={f_mid}");

        // check |f(m)| first, then half-width
        let tolerance = if f_mid.abs() <= epsilon {
            Some(ToleranceSatisfied::AbsFxReached)
        } else if half_width(lo, hi) <= epsilon {
            Some(ToleranceSatisfied::WidthTolReached)
        } else {
            None
        };

        if let Some(tolerance_satisfied) = tolerance {
            return Ok(RootFindingReport {
                root                : mid,
                f_root              : f_mid,
                iterations          : iter,
                evaluations         : evals,
                termination_reason  : TerminationReason::ToleranceReached,
                tolerance_satisfied,
                stencil             : Stencil::bracket(lo, hi),
                algorithm_name      : algo_name
            });
        }

        // shrink interval
        if opposite_sign(f_lo, f_mid) {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    debug!("bisection: iteration limit {num_iter} reached at m={mid}");
    Ok(RootFindingReport {
        root                : mid,
        f_root              : f_mid,
        iterations          : num_iter,
        evaluations         : evals,
        termination_reason  : TerminationReason::IterationLimit,
        tolerance_satisfied : ToleranceSatisfied::ToleranceNotReached,
        stencil             : Stencil::bracket(lo, hi),
        algorithm_name      : algo_name
    })
}
