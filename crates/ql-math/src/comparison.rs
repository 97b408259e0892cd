//! Floating-point comparison in units of machine epsilon.
//!
//! [`close`] requires the difference to be small relative to *both*
//! operands; [`close_enough`] relative to *either*. When one operand is
//! exactly zero the test degenerates to an absolute one against `tol²`.

use ql_core::{Real, QL_EPSILON};

/// Default number of epsilons used by [`close`] and [`close_enough`].
pub const DEFAULT_ULPS: u32 = 42;

/// `true` if `x` and `y` agree to within `n` machine epsilons on both sides.
#[inline]
pub fn close_n(x: Real, y: Real, n: u32) -> bool {
    if x == y {
        return true;
    }
    let diff = (x - y).abs();
    let tolerance = n as Real * QL_EPSILON;
    if x * y == 0.0 {
        return diff < tolerance * tolerance;
    }
    diff <= tolerance * x.abs() && diff <= tolerance * y.abs()
}

/// [`close_n`] with the default 42 epsilons.
#[inline]
pub fn close(x: Real, y: Real) -> bool {
    close_n(x, y, DEFAULT_ULPS)
}

/// `true` if `x` and `y` agree to within `n` machine epsilons on either side.
#[inline]
pub fn close_enough_n(x: Real, y: Real, n: u32) -> bool {
    if x == y {
        return true;
    }
    let diff = (x - y).abs();
    let tolerance = n as Real * QL_EPSILON;
    if x * y == 0.0 {
        return diff < tolerance * tolerance;
    }
    diff <= tolerance * x.abs() || diff <= tolerance * y.abs()
}

/// [`close_enough_n`] with the default 42 epsilons.
#[inline]
pub fn close_enough(x: Real, y: Real) -> bool {
    close_enough_n(x, y, DEFAULT_ULPS)
}
