//! Derivatives of arbitrary order from Fornberg weights.

use super::FdmLinearOp;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Size};
use ql_math::{Array, SparseMatrix};

/// Weights `w` with `f⁽ᵐ⁾(x0) ≈ Σ wᵢ f(xs[i])` (Fornberg, 1988).
pub fn fornberg_weights(x0: Real, xs: &[Real], order: Size) -> Vec<Real> {
    let n = xs.len();
    let mut c = vec![vec![0.0; order + 1]; n];
    c[0][0] = 1.0;
    let mut c1 = 1.0;
    let mut c4 = xs[0] - x0;
    for i in 1..n {
        let mn = i.min(order);
        let mut c2 = 1.0;
        let c5 = c4;
        c4 = xs[i] - x0;
        for j in 0..i {
            let c3 = xs[i] - xs[j];
            c2 *= c3;
            if j == i - 1 {
                for k in (1..=mn).rev() {
                    c[i][k] = c1 * (k as Real * c[i - 1][k - 1] - c5 * c[i - 1][k]) / c2;
                }
                c[i][0] = -c1 * c5 * c[i - 1][0] / c2;
            }
            for k in (1..=mn).rev() {
                c[j][k] = (c4 * c[j][k] - k as Real * c[j][k - 1]) / c3;
            }
            c[j][0] = c4 * c[j][0] / c3;
        }
        c1 = c2;
    }
    c.into_iter().map(|row| row[order]).collect()
}

/// `∂ⁿ/∂xⁿ` along one direction on a window of `n_points` grid points.
///
/// The window is centred on each point and shifted inwards near the
/// boundaries, so the stencil stays inside the grid.
///
/// Corresponds to `QuantLib::NthOrderDerivativeOp`.
#[derive(Debug, Clone)]
pub struct NthOrderDerivativeOp {
    m: SparseMatrix,
}

impl NthOrderDerivativeOp {
    /// Stencil of the given order along `direction`.
    pub fn new(direction: Size, order: Size, n_points: Size, mesher: &dyn FdmMesher) -> Result<Self> {
        let layout = mesher.layout();
        let dim = layout.dim()[direction];
        ensure!(n_points % 2 == 1, "number of points must be odd, got {n_points}");
        ensure!(
            n_points > order,
            "{n_points} points cannot resolve a derivative of order {order}"
        );
        ensure!(
            dim >= n_points,
            "direction {direction} has {dim} points, stencil needs {n_points}"
        );
        let half = n_points / 2;
        let stride = layout.spacing()[direction];
        let x = mesher.locations(direction);

        let mut m = SparseMatrix::new(layout.size(), layout.size());
        for iter in layout.iter() {
            let i = iter.index();
            let c = iter.coordinates()[direction];
            let start = c.saturating_sub(half).min(dim - n_points);
            let base = i - c * stride;
            let window: Vec<Size> = (start..start + n_points).map(|k| base + k * stride).collect();
            let xs: Vec<Real> = window.iter().map(|&j| x[j]).collect();
            let weights = fornberg_weights(x[i], &xs, order);
            for (&j, w) in window.iter().zip(weights) {
                m.add(i, j, w)?;
            }
        }
        Ok(Self { m })
    }
}

impl FdmLinearOp for NthOrderDerivativeOp {
    fn apply(&self, r: &Array) -> Array {
        self.m.mul_vec(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        Ok(self.m.clone())
    }
}
