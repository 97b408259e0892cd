//! Numerical integration.

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};

/// A numerical integrator on a finite interval.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real>;
}

/// Simpson's rule obtained by Richardson extrapolation of successively
/// refined trapezoid sums.
///
/// Each iteration doubles the number of intervals; the rule stops when two
/// consecutive Simpson estimates differ by at most `absolute_accuracy`.
#[derive(Debug, Clone, Copy)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_iterations: usize,
}

impl SimpsonIntegral {
    /// Fewest refinements before convergence is tested.
    pub const MIN_ITERATIONS: usize = 5;

    /// Integrator with the given tolerance and refinement budget.
    pub fn new(absolute_accuracy: Real, max_iterations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_iterations,
        }
    }

    /// Composite Simpson sum with a fixed, even number of intervals.
    pub fn fixed<F: Fn(Real) -> Real>(f: F, a: Real, b: Real, intervals: usize) -> Real {
        let n = intervals.max(2) + intervals % 2;
        let h = (b - a) / n as Real;
        let inner: Real = (1..n)
            .map(|i| {
                let w = if i % 2 == 1 { 4.0 } else { 2.0 };
                w * f(a + i as Real * h)
            })
            .sum();
        h / 3.0 * (f(a) + inner + f(b))
    }
}

/// Add the midpoints of the `n` current intervals to the trapezoid sum `i`.
fn refine_trapezoid<F: Fn(Real) -> Real>(f: &F, a: Real, b: Real, i: Real, n: usize) -> Real {
    let dx = (b - a) / n as Real;
    let mut x = a + 0.5 * dx;
    let mut sum = 0.0;
    for _ in 0..n {
        sum += f(x);
        x += dx;
    }
    0.5 * (i + dx * sum)
}

impl Integrator for SimpsonIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        ensure!(
            self.absolute_accuracy > 0.0,
            "required accuracy ({}) must be positive",
            self.absolute_accuracy
        );
        if a == b {
            return Ok(0.0);
        }

        let mut trapezoid = 0.5 * (f(a) + f(b)) * (b - a);
        let mut simpson = trapezoid;
        let mut n = 1;
        let mut last_change = Real::INFINITY;

        for iteration in 1..=self.max_iterations {
            let refined = refine_trapezoid(&f, a, b, trapezoid, n);
            n *= 2;
            let next = (4.0 * refined - trapezoid) / 3.0;
            last_change = (simpson - next).abs();
            if last_change <= self.absolute_accuracy && iteration > Self::MIN_ITERATIONS {
                return Ok(next);
            }
            trapezoid = refined;
            simpson = next;
        }
        Err(Error::Convergence {
            method: "Simpson integral",
            iterations: self.max_iterations,
            error: last_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn integrates_cubic_exactly() {
        let s = SimpsonIntegral::new(1e-12, 20);
        let r = s.integrate(|x| x * x * x - x, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(r, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn integrates_exponential() {
        let s = SimpsonIntegral::new(1e-10, 20);
        let r = s.integrate(Real::exp, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(r, std::f64::consts::E - 1.0, epsilon = 1e-10);
    }

    #[test]
    fn reports_non_convergence() {
        let s = SimpsonIntegral::new(1e-14, 6);
        let r = s.integrate(|x| (50.0 * x).sin().abs().sqrt(), 0.0, 3.0);
        assert!(matches!(r, Err(Error::Convergence { .. })));
    }

    #[test]
    fn fixed_rule_matches_adaptive() {
        let fixed = SimpsonIntegral::fixed(|x: Real| x.cos(), 0.0, 1.5, 400);
        assert_abs_diff_eq!(fixed, 1.5_f64.sin(), epsilon = 1e-10);
    }
}
