//! Natural cubic spline.
//!
//! Slopes `tᵢ` at the nodes solve the tridiagonal C² system with vanishing
//! second derivative at both ends. On `[xᵢ, xᵢ₊₁]` with `dx = x - xᵢ`:
//!
//! `f(x) = yᵢ + dx (aᵢ + dx (bᵢ + dx cᵢ))`.

use super::{check_nodes, locate, Interpolation1D};
use ql_core::{errors::Result, Real};

/// C² cubic spline with natural end conditions.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Spline through `(xs[i], ys[i])`; needs at least two nodes.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let dx: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dx[i]).collect();

        let mut lower = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut upper = vec![0.0; n];
        let mut rhs = vec![0.0; n];

        diag[0] = 2.0;
        upper[0] = 1.0;
        rhs[0] = 3.0 * s[0];
        for i in 1..n - 1 {
            lower[i] = dx[i];
            diag[i] = 2.0 * (dx[i] + dx[i - 1]);
            upper[i] = dx[i - 1];
            rhs[i] = 3.0 * (dx[i] * s[i - 1] + dx[i - 1] * s[i]);
        }
        lower[n - 1] = 1.0;
        diag[n - 1] = 2.0;
        rhs[n - 1] = 3.0 * s[n - 2];

        let t = solve_tridiagonal(&lower, &diag, &upper, &rhs);

        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            a.push(t[i]);
            b.push((3.0 * s[i] - t[i + 1] - 2.0 * t[i]) / dx[i]);
            c.push((t[i + 1] + t[i] - 2.0 * s[i]) / (dx[i] * dx[i]));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
        })
    }

    /// Node abscissas.
    pub fn xs(&self) -> &[Real] {
        &self.xs
    }
}

/// Thomas algorithm; the system must be diagonally dominant.
fn solve_tridiagonal(lower: &[Real], diag: &[Real], upper: &[Real], rhs: &[Real]) -> Vec<Real> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut x = vec![0.0; n];

    let mut bet = diag[0];
    x[0] = rhs[0] / bet;
    for i in 1..n {
        c_prime[i] = upper[i - 1] / bet;
        bet = diag[i] - lower[i] * c_prime[i];
        x[i] = (rhs[i] - lower[i] * x[i - 1]) / bet;
    }
    for i in (0..n - 1).rev() {
        x[i] -= c_prime[i + 1] * x[i + 1];
    }
    x
}

impl Interpolation1D for CubicNaturalSpline {
    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * self.c[i] * dx)
    }

    fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + 6.0 * self.c[i] * dx
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}
