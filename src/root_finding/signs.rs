//! Sign utilities for root-finding algorithms.
//! - `opposite_sign`        : `true` if values have opposite sign
//! - `strictly_same_sign`   : `true` if values share a sign and neither is zero
//!
//! Sign bits are compared directly, so tiny values that would underflow
//! in `x * y` are still classified correctly.

/// Returns `true` if `x` and `y` have opposite signs.
#[inline]
pub(crate) fn opposite_sign(x: f64, y: f64) -> bool {
    x.is_sign_positive() != y.is_sign_positive()
}


/// Returns `true` if `x * y > 0` mathematically.
#[inline]
pub(crate) fn strictly_same_sign(x: f64, y: f64) -> bool {
    x != 0.0 && y != 0.0 && x.is_sign_positive() == y.is_sign_positive()
}
