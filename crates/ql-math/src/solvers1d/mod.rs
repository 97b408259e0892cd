//! One-dimensional root finding.
//!
//! [`brent`] is the workhorse; [`bracket`] grows an interval geometrically
//! around a guess until it straddles a sign change, for callers (such as
//! quantile inversion) that have no natural search interval.

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, QL_EPSILON,
};

const MAX_ITERATIONS: usize = 100;
const MAX_BRACKET_EXPANSIONS: usize = 60;
const DEFAULT_ACCURACY: Real = 1.0e-11;

/// Brent's method for a root of `f` inside `[x_min, x_max]`.
///
/// Requires `f(x_min)` and `f(x_max)` to have opposite signs.
pub fn brent<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let (mut a, mut b) = (x_min, x_max);
    let (mut fa, mut fb) = (f(a), f(b));

    ensure!(
        fa * fb <= 0.0,
        "root not bracketed: f({a}) = {fa}, f({b}) = {fb}"
    );
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * QL_EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);
    }
    Err(Error::Convergence {
        method: "Brent",
        iterations: MAX_ITERATIONS,
        error: fb.abs(),
    })
}

/// Grow `[guess - step, guess + step]` until `f` changes sign across it.
///
/// The interval is clipped to `[lower, upper]`; returns the bracketing pair.
pub fn bracket<F>(f: F, guess: Real, step: Real, lower: Real, upper: Real) -> Result<(Real, Real)>
where
    F: Fn(Real) -> Real,
{
    ensure!(step > 0.0, "bracketing step must be positive, got {step}");
    ensure!(lower < upper, "empty search domain [{lower}, {upper}]");
    let mut x_lo = (guess - step).max(lower);
    let mut x_hi = (guess + step).min(upper);
    let (mut f_lo, mut f_hi) = (f(x_lo), f(x_hi));
    let mut width = step;

    for _ in 0..MAX_BRACKET_EXPANSIONS {
        if f_lo * f_hi <= 0.0 {
            return Ok((x_lo, x_hi));
        }
        width *= 1.6;
        // walk downhill in |f|
        if f_lo.abs() < f_hi.abs() && x_lo > lower {
            x_lo = (x_lo - width).max(lower);
            f_lo = f(x_lo);
        } else if x_hi < upper {
            x_hi = (x_hi + width).min(upper);
            f_hi = f(x_hi);
        } else if x_lo > lower {
            x_lo = (x_lo - width).max(lower);
            f_lo = f(x_lo);
        } else {
            break;
        }
    }
    Err(Error::Runtime(format!(
        "unable to bracket a root around {guess} within [{lower}, {upper}]"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn brent_finds_square_root() {
        let x = brent(|x| x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(x, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn brent_rejects_unbracketed_interval() {
        assert!(matches!(
            brent(|x| x * x + 1.0, -1.0, 1.0, 1e-10),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn bracket_then_solve_cubic() {
        let f = |x: Real| x * x * x - 30.0;
        let (lo, hi) = bracket(f, 0.5, 0.1, 0.0, 1e6).unwrap();
        assert!(f(lo) * f(hi) <= 0.0);
        let x = brent(f, lo, hi, 1e-12).unwrap();
        assert_abs_diff_eq!(x, 30.0_f64.cbrt(), epsilon = 1e-9);
    }

    #[test]
    fn bracket_respects_domain() {
        assert!(bracket(|x| x + 10.0, 1.0, 0.5, 0.0, 5.0).is_err());
    }
}
