//! Three-point stencil along one direction.

use super::{FdmLinearOp, FdmLinearOpLayout};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, fail, Real, Size};
use ql_math::{Array, SparseMatrix};
use std::sync::Arc;

/// `(L r)[i] = lower[i]·r[i0[i]] + diag[i]·r[i] + upper[i]·r[i2[i]]`,
/// where `i0` and `i2` are the neighbours of `i` along `direction`.
///
/// At the grid boundaries the neighbour indices reflect back into the
/// grid; boundary stencils are expected to put a zero weight on them.
///
/// Corresponds to `QuantLib::TripleBandLinearOp`.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    direction: Size,
    layout: Arc<FdmLinearOpLayout>,
    i0: Arc<[Size]>,
    i2: Arc<[Size]>,
    reverse_index: Arc<[Size]>,
    pub(crate) lower: Vec<Real>,
    pub(crate) diag: Vec<Real>,
    pub(crate) upper: Vec<Real>,
}

impl TripleBandLinearOp {
    /// Zero stencil along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: &dyn FdmMesher) -> Self {
        let layout = Arc::clone(mesher.layout());
        let size = layout.size();

        let mut new_dim = layout.dim().to_vec();
        new_dim.swap(0, direction);
        let mut new_spacing = FdmLinearOpLayout::new(new_dim).spacing().to_vec();
        new_spacing.swap(0, direction);

        let mut i0 = vec![0; size];
        let mut i2 = vec![0; size];
        let mut reverse_index = vec![0; size];
        for iter in layout.iter() {
            let i = iter.index();
            i0[i] = layout.neighbourhood(&iter, direction, -1);
            i2[i] = layout.neighbourhood(&iter, direction, 1);
            let new_index: Size = iter
                .coordinates()
                .iter()
                .zip(&new_spacing)
                .map(|(c, s)| c * s)
                .sum();
            reverse_index[new_index] = i;
        }
        Self {
            direction,
            layout,
            i0: i0.into(),
            i2: i2.into(),
            reverse_index: reverse_index.into(),
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
        }
    }

    fn with_bands(&self, lower: Vec<Real>, diag: Vec<Real>, upper: Vec<Real>) -> Self {
        Self {
            direction: self.direction,
            layout: Arc::clone(&self.layout),
            i0: Arc::clone(&self.i0),
            i2: Arc::clone(&self.i2),
            reverse_index: Arc::clone(&self.reverse_index),
            lower,
            diag,
            upper,
        }
    }

    /// Direction of the stencil.
    pub fn direction(&self) -> Size {
        self.direction
    }

    /// Sub-diagonal weights.
    pub fn lower(&self) -> &[Real] {
        &self.lower
    }

    /// Diagonal weights.
    pub fn diag(&self) -> &[Real] {
        &self.diag
    }

    /// Super-diagonal weights.
    pub fn upper(&self) -> &[Real] {
        &self.upper
    }

    /// `self ← a·x + y + b·I`, pointwise per grid point.
    ///
    /// `a` and `b` may be empty (term omitted), hold a single value
    /// (broadcast) or one value per grid point.
    pub fn axpyb(&mut self, a: &[Real], x: &TripleBandLinearOp, y: &TripleBandLinearOp, b: &[Real]) {
        let pick = |v: &[Real], i: usize| if v.len() > 1 { v[i] } else { v[0] };
        for i in 0..self.layout.size() {
            let (mut l, mut d, mut u) = (y.lower[i], y.diag[i], y.upper[i]);
            if !a.is_empty() {
                let s = pick(a, i);
                l += s * x.lower[i];
                d += s * x.diag[i];
                u += s * x.upper[i];
            }
            if !b.is_empty() {
                d += pick(b, i);
            }
            self.lower[i] = l;
            self.diag[i] = d;
            self.upper[i] = u;
        }
    }

    /// Band-wise sum of two stencils along the same direction.
    pub fn add(&self, m: &TripleBandLinearOp) -> TripleBandLinearOp {
        let sum = |a: &[Real], b: &[Real]| a.iter().zip(b).map(|(x, y)| x + y).collect();
        self.with_bands(
            sum(&self.lower, &m.lower),
            sum(&self.diag, &m.diag),
            sum(&self.upper, &m.upper),
        )
    }

    /// `L + diag(u)`.
    pub fn add_array(&self, u: &Array) -> TripleBandLinearOp {
        let diag = self.diag.iter().zip(u.iter()).map(|(d, x)| d + x).collect();
        self.with_bands(self.lower.clone(), diag, self.upper.clone())
    }

    /// `diag(u)·L`: row `i` scaled by `u[i]`.
    pub fn mult(&self, u: &Array) -> TripleBandLinearOp {
        let scale = |band: &[Real]| band.iter().zip(u.iter()).map(|(w, s)| w * s).collect();
        self.with_bands(scale(&self.lower), scale(&self.diag), scale(&self.upper))
    }

    /// Bands scaled by the neighbouring entries of `u`: lower by
    /// `u[i-1]`, diagonal by `u[i]`, upper by `u[i+1]`, with 1 past the
    /// ends.
    pub fn mult_r(&self, u: &Array) -> Result<TripleBandLinearOp> {
        let size = self.layout.size();
        ensure!(u.len() == size, "inconsistent size of rhs");
        let mut lower = vec![0.0; size];
        let mut diag = vec![0.0; size];
        let mut upper = vec![0.0; size];
        for i in 0..size {
            let sm1 = if i > 0 { u[i - 1] } else { 1.0 };
            let sp1 = if i + 1 < size { u[i + 1] } else { 1.0 };
            lower[i] = self.lower[i] * sm1;
            diag[i] = self.diag[i] * u[i];
            upper[i] = self.upper[i] * sp1;
        }
        Ok(self.with_bands(lower, diag, upper))
    }

    /// Solve `(a·L + b·I) x = r` by the Thomas algorithm, running along
    /// `direction` line by line.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Result<Array> {
        let n = self.layout.size();
        ensure!(r.len() == n, "inconsistent size of rhs: {} vs {n}", r.len());
        let ri = &self.reverse_index;
        let mut ret = Array::zeros(n);
        let mut tmp = vec![0.0; n];

        let mut rim1 = ri[0];
        let mut bet = a * self.diag[rim1] + b;
        if bet == 0.0 {
            fail!("division by zero in tridiagonal solve");
        }
        bet = 1.0 / bet;
        ret[rim1] = r[rim1] * bet;
        for j in 1..n {
            let i = ri[j];
            tmp[j] = a * self.upper[rim1] * bet;
            bet = b + a * (self.diag[i] - tmp[j] * self.lower[i]);
            if bet == 0.0 {
                fail!("division by zero in tridiagonal solve");
            }
            bet = 1.0 / bet;
            ret[i] = (r[i] - a * self.lower[i] * ret[rim1]) * bet;
            rim1 = i;
        }
        for j in (0..n.saturating_sub(1)).rev() {
            let next = ret[ri[j + 1]];
            ret[ri[j]] -= tmp[j + 1] * next;
        }
        Ok(ret)
    }
}

impl FdmLinearOp for TripleBandLinearOp {
    fn apply(&self, r: &Array) -> Array {
        debug_assert_eq!(r.len(), self.layout.size(), "inconsistent length of r");
        Array::from_fn(self.layout.size(), |i| {
            r[self.i0[i]] * self.lower[i] + r[i] * self.diag[i] + r[self.i2[i]] * self.upper[i]
        })
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        let n = self.layout.size();
        let mut m = SparseMatrix::new(n, n);
        for i in 0..n {
            m.add(i, self.i0[i], self.lower[i])?;
            m.add(i, i, self.diag[i])?;
            m.add(i, self.i2[i], self.upper[i])?;
        }
        Ok(m)
    }
}

/// Named wrapper around a [`TripleBandLinearOp`].
macro_rules! triple_band_newtype {
    ($name:ident) => {
        impl std::ops::Deref for $name {
            type Target = $crate::finite_differences::operators::TripleBandLinearOp;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$name> for $crate::finite_differences::operators::TripleBandLinearOp {
            fn from(op: $name) -> Self {
                op.0
            }
        }

        impl $crate::finite_differences::operators::FdmLinearOp for $name {
            fn apply(&self, r: &ql_math::Array) -> ql_math::Array {
                self.0.apply(r)
            }

            fn to_matrix(&self) -> ql_core::errors::Result<ql_math::SparseMatrix> {
                self.0.to_matrix()
            }
        }
    };
}
pub(crate) use triple_band_newtype;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::operators::{FirstDerivativeOp, SecondDerivativeOp};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn mesher_2d(n0: usize, n1: usize) -> FdmMesherComposite {
        FdmMesherComposite::from_2d(
            Uniform1dMesher::new(0.0, 1.0, n0).unwrap(),
            Uniform1dMesher::new(-1.0, 2.0, n1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn axpyb_broadcasts_scalars() {
        let m = mesher_2d(5, 4);
        let dx = FirstDerivativeOp::new(0, &m);
        let dxx = SecondDerivativeOp::new(0, &m);
        let mut op = TripleBandLinearOp::new(0, &m);
        op.axpyb(&[2.0], &dx, &dxx, &[-1.0]);
        for i in 0..20 {
            assert_abs_diff_eq!(op.diag()[i], 2.0 * dx.diag()[i] + dxx.diag()[i] - 1.0);
            assert_abs_diff_eq!(op.upper()[i], 2.0 * dx.upper()[i] + dxx.upper()[i]);
        }
        op.axpyb(&[], &dx, &dxx, &[]);
        assert_eq!(op.lower(), dxx.lower());
    }

    #[test]
    fn apply_matches_matrix() {
        let m = mesher_2d(6, 5);
        for d in 0..2 {
            let op = SecondDerivativeOp::new(d, &m).add(&FirstDerivativeOp::new(d, &m));
            let x = Array::from_fn(30, |i| (i as Real * 0.37).sin());
            let dense = op.to_matrix().unwrap().to_dense();
            let y = op.apply(&x);
            let z = dense.mul_vec(&x);
            for i in 0..30 {
                assert_abs_diff_eq!(y[i], z[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn mult_r_scales_neighbours() {
        let m = mesher_2d(4, 2);
        let op = FirstDerivativeOp::new(0, &m);
        let u = Array::from_fn(8, |i| 1.0 + i as Real);
        let s = op.mult_r(&u).unwrap();
        assert_abs_diff_eq!(s.lower()[2], op.lower()[2] * u[1]);
        assert_abs_diff_eq!(s.upper()[2], op.upper()[2] * u[3]);
        assert_abs_diff_eq!(s.lower()[0], op.lower()[0]);
        assert!(op.mult_r(&Array::zeros(3)).is_err());
    }

    proptest! {
        #[test]
        fn solve_splitting_inverts_the_shifted_operator(
            d in 0usize..2, a in 0.01f64..0.5, seed in 0u32..1000,
        ) {
            let m = mesher_2d(7, 6);
            let op = SecondDerivativeOp::new(d, &m).add(&FirstDerivativeOp::new(d, &m));
            let x = Array::from_fn(42, |i| ((i as u32 * 7919 + seed) % 101) as Real / 101.0);
            let r = &(op.apply(&x) * (-a)) + &x;
            let y = op.solve_splitting(&r, -a, 1.0).unwrap();
            for i in 0..42 {
                prop_assert!((y[i] - x[i]).abs() < 1e-9);
            }
        }
    }
}
