//! Stabilised bi-conjugate gradient solver for non-symmetric systems.
//!
//! The matrix is only ever applied, never stored: implicit finite-difference
//! schemes pass their operator as a closure and use the direction-0 splitting
//! solve as preconditioner.

use crate::array::Array;
use ql_core::{errors::Error, errors::Result, Real};
use tracing::trace;

/// Matrix-free linear map.
pub type MatrixMult<'a> = dyn Fn(&Array) -> Result<Array> + 'a;

/// Outcome of a converged solve.
#[derive(Debug, Clone)]
pub struct BiCGStabResult {
    /// Iterations performed.
    pub iterations: usize,
    /// Final relative residual `‖b - Ax‖ / ‖b‖`.
    pub error: Real,
    /// Solution.
    pub x: Array,
}

/// Solver for `A x = b` with optional preconditioner `M ≈ A⁻¹`.
pub struct BiCGStab<'a> {
    a: &'a MatrixMult<'a>,
    max_iterations: usize,
    rel_tolerance: Real,
    preconditioner: Option<&'a MatrixMult<'a>>,
}

impl std::fmt::Debug for BiCGStab<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiCGStab")
            .field("max_iterations", &self.max_iterations)
            .field("rel_tolerance", &self.rel_tolerance)
            .field("preconditioned", &self.preconditioner.is_some())
            .finish()
    }
}

impl<'a> BiCGStab<'a> {
    /// Unpreconditioned solver.
    pub fn new(a: &'a MatrixMult<'a>, max_iterations: usize, rel_tolerance: Real) -> Self {
        Self {
            a,
            max_iterations,
            rel_tolerance,
            preconditioner: None,
        }
    }

    /// Use `m` as right preconditioner.
    pub fn with_preconditioner(mut self, m: &'a MatrixMult<'a>) -> Self {
        self.preconditioner = Some(m);
        self
    }

    fn precondition(&self, x: &Array) -> Result<Array> {
        match self.preconditioner {
            Some(m) => m(x),
            None => Ok(x.clone()),
        }
    }

    /// Solve `A x = b` starting from `x0` (zero if `None`).
    ///
    /// Fails if the iteration cap is reached or the relative residual does
    /// not drop below the tolerance.
    pub fn solve(&self, b: &Array, x0: Option<&Array>) -> Result<BiCGStabResult> {
        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.clone(),
            });
        }

        let mut x = x0.cloned().unwrap_or_else(|| Array::zeros(b.len()));
        let mut r = b - &(self.a)(&x)?;
        let r_tld = r.clone();
        let mut p = Array::zeros(b.len());
        let mut v = Array::zeros(b.len());
        let (mut omega, mut rho_tld, mut alpha) = (1.0, 1.0, 0.0);
        let mut error = r.norm() / b_norm;

        let mut i = 0;
        while i < self.max_iterations && error >= self.rel_tolerance {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }
            p = if i > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                &r + &((&p - &(&v * omega)) * beta)
            } else {
                r.clone()
            };
            let p_tld = self.precondition(&p)?;
            v = (self.a)(&p_tld)?;
            alpha = rho / r_tld.dot(&v);
            let s = &r - &(&v * alpha);
            if s.norm() < self.rel_tolerance * b_norm {
                x.axpy(alpha, &p_tld);
                error = s.norm() / b_norm;
                break;
            }
            let s_tld = self.precondition(&s)?;
            let t = (self.a)(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);
            x.axpy(alpha, &p_tld);
            x.axpy(omega, &s_tld);
            r = &s - &(&t * omega);
            error = r.norm() / b_norm;
            rho_tld = rho;
            i += 1;
        }
        trace!(iterations = i, error, "BiCGStab finished");

        if i >= self.max_iterations || error >= self.rel_tolerance {
            return Err(Error::Convergence {
                method: "BiCGStab",
                iterations: i,
                error,
            });
        }
        Ok(BiCGStabResult {
            iterations: i,
            error,
            x,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use approx::assert_abs_diff_eq;

    fn system() -> (Matrix, Array) {
        let a = Matrix::from_row_slice(
            4,
            4,
            &[
                4.0, -1.0, 0.0, 0.5, //
                -2.0, 5.0, -1.0, 0.0, //
                0.0, -1.5, 6.0, -1.0, //
                0.3, 0.0, -1.0, 3.0,
            ],
        );
        (a, Array::from_slice(&[1.0, 2.0, -1.0, 0.5]))
    }

    #[test]
    fn solves_non_symmetric_system() {
        let (a, b) = system();
        let mult = |x: &Array| -> Result<Array> { Ok(a.mul_vec(x)) };
        let res = BiCGStab::new(&mult, 50, 1e-12).solve(&b, None).unwrap();
        let residual = &a.mul_vec(&res.x) - &b;
        assert!(residual.norm() < 1e-10);
        assert!(res.iterations <= 10);
    }

    #[test]
    fn preconditioning_with_the_exact_inverse_converges_at_once() {
        let (a, b) = system();
        let inv = a.try_inverse().unwrap();
        let mult = |x: &Array| -> Result<Array> { Ok(a.mul_vec(x)) };
        let precond = |x: &Array| -> Result<Array> { Ok(inv.mul_vec(x)) };
        let res = BiCGStab::new(&mult, 50, 1e-10)
            .with_preconditioner(&precond)
            .solve(&b, None)
            .unwrap();
        assert_eq!(res.iterations, 0);
        let expected = inv.mul_vec(&b);
        for k in 0..4 {
            assert_abs_diff_eq!(res.x[k], expected[k], epsilon = 1e-10);
        }
    }

    #[test]
    fn zero_rhs_returns_immediately() {
        let (a, _) = system();
        let mult = |x: &Array| -> Result<Array> { Ok(a.mul_vec(x)) };
        let res = BiCGStab::new(&mult, 5, 1e-8).solve(&Array::zeros(4), None).unwrap();
        assert_eq!(res.iterations, 0);
        assert_eq!(res.error, 0.0);
    }

    #[test]
    fn iteration_cap_is_a_convergence_error() {
        let (a, b) = system();
        let mult = |x: &Array| -> Result<Array> { Ok(a.mul_vec(x)) };
        let err = BiCGStab::new(&mult, 1, 1e-14).solve(&b, None).unwrap_err();
        assert!(matches!(err, Error::Convergence { method: "BiCGStab", .. }));
    }
}
