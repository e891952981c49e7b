//! Finite-difference derivative approximations.
//!
//! ┌ [`difference_quotient`]         : central, (f(x+h) - f(x-h)) / 2h
//! ├ [`forward_difference_quotient`] : forward, (f(x+h) - f(x)) / h
//! ├ [`second_difference_quotient`]  : central second derivative
//! ├ [`checked_difference_quotient`] : central, validated inputs and outputs
//! └ [`default_step`]                : `eps^{1/3} * max(|x|, 1)`
//!
//! The unchecked variants are plain arithmetic: `h == 0` yields NaN or inf
//! and avoiding it is the caller's job.

use thiserror::Error;


#[derive(Debug, Error, PartialEq)]
pub enum DifferenceError {
    #[error("invalid step: h must be finite and non-zero. got h={h}")]
    InvalidStep { h: f64 },

    #[error("invalid point: x must be finite. got x={x}")]
    InvalidPoint { x: f64 },

    #[error("finite-difference step not representable at x={x}, h={h}")]
    StepUnrepresentable { x: f64, h: f64 },

    #[error("function non-finite at x={x}, f(x)={fx}")]
    NonFiniteEvaluation { x: f64, fx: f64 },
}


/// Central difference quotient, an O(h²) approximation of f'(x).
///
/// Uses exactly two evaluations of `func`.
///
/// # Example
/// ```
/// use numroot::root_finding::difference::difference_quotient;
///
/// let d = difference_quotient(|x: f64| x * x, 3.0, 1e-3);
/// assert!((d - 6.0).abs() < 1e-9);
/// ```
#[inline]
pub fn difference_quotient<F>(mut func: F, x: f64, h: f64) -> f64
where F: FnMut(f64) -> f64 {
    (func(x + h) - func(x - h)) / (2.0 * h)
}


/// Forward difference quotient, an O(h) approximation of f'(x).
#[inline]
pub fn forward_difference_quotient<F>(mut func: F, x: f64, h: f64) -> f64
where F: FnMut(f64) -> f64 {
    (func(x + h) - func(x)) / h
}


/// Central second difference, an O(h²) approximation of f''(x).
#[inline]
pub fn second_difference_quotient<F>(mut func: F, x: f64, h: f64) -> f64
where F: FnMut(f64) -> f64 {
    (func(x + h) - 2.0 * func(x) + func(x - h)) / (h * h)
}


/// Step size balancing truncation and rounding error for the central
/// quotient in double precision.
#[inline]
pub fn default_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}


/// [`difference_quotient`] with input and output validation.
///
/// # Errors
/// - [`DifferenceError::InvalidPoint`]        : `x` is NaN/inf
/// - [`DifferenceError::InvalidStep`]         : `h` is zero or NaN/inf
/// - [`DifferenceError::StepUnrepresentable`] : `x + h` or `x - h` rounds back to `x`
///   or overflows
/// - [`DifferenceError::NonFiniteEvaluation`] : `func` returned NaN/inf
///
/// The effective step is `(x + h) - (x - h)` rather than `2h`, so the
/// result reflects the abscissae that were actually evaluated.
pub fn checked_difference_quotient<F>(
    mut func: F,
    x: f64,
    h: f64
) -> Result<f64, DifferenceError>
where F: FnMut(f64) -> f64 {
    if !x.is_finite() {
        return Err(DifferenceError::InvalidPoint { x });
    }
    if !h.is_finite() || h == 0.0 {
        return Err(DifferenceError::InvalidStep { h });
    }

    let xp = x + h;
    let xm = x - h;
    if !xp.is_finite() || !xm.is_finite() || xp == x || xm == x {
        return Err(DifferenceError::StepUnrepresentable { x, h });
    }

    let mut eval = |t: f64| -> Result<f64, DifferenceError> {
        let ft = func(t);
        if !ft.is_finite() {
            return Err(DifferenceError::NonFiniteEvaluation { x: t, fx: ft });
        }
        Ok(ft)
    };

    let fxp = eval(xp)?;
    let fxm = eval(xm)?;
    Ok((fxp - fxm) / (xp - xm))
}
