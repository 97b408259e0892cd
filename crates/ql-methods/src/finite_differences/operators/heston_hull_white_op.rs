//! Heston model with a Hull-White short rate on a (log-spot, variance,
//! short-rate state) mesher.
//!
//! ```text
//! L = (x + φ(t) − q − ½v) ∂ₛ + ½v ∂ₛₛ
//!   + κ(θ − v) ∂ᵥ + ½σ²v ∂ᵥᵥ
//!   − a x ∂ₓ + ½σᵣ² ∂ₓₓ − (x + φ(t))
//!   + ρσv ∂ₛᵥ + ρₛᵣ σᵣ √v ∂ₛₓ
//! ```
//!
//! The discount term sits entirely in the short-rate direction.
//!
//! Corresponds to `QuantLib::FdmHestonHullWhiteOp`.

use super::{
    FdmHullWhiteOp, FdmLinearOp, FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp,
    SecondDerivativeOp, SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_math::{Array, SparseMatrix};
use ql_processes::{HestonProcess, HullWhiteProcess};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

// ── Equity direction ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct EquityPart {
    x: Array,
    variance_values: Array,
    dx_map: FirstDerivativeOp,
    dxx_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
    q_ts: Arc<dyn YieldTermStructure>,
    hull_white: HullWhiteProcess,
}

impl EquityPart {
    fn new(
        mesher: &dyn FdmMesher,
        hull_white: &HullWhiteProcess,
        q_ts: Arc<dyn YieldTermStructure>,
    ) -> Self {
        let v = mesher.locations(1);
        let last = mesher.layout().dim()[0] - 1;
        let mut variance_values = &v * 0.5;
        for iter in mesher.layout().iter() {
            let c = iter.coordinates()[0];
            if c == 0 || c == last {
                variance_values[iter.index()] = 0.0;
            }
        }
        Self {
            x: mesher.locations(2),
            variance_values,
            dx_map: FirstDerivativeOp::new(0, mesher),
            dxx_map: SecondDerivativeOp::new(0, mesher).mult(&(&v * 0.5)),
            map_t: TripleBandLinearOp::new(0, mesher),
            q_ts,
            hull_white: hull_white.clone(),
        }
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let phi = 0.5 * (self.hull_white.phi(t1) + self.hull_white.phi(t2));
        let q = self.q_ts.forward_rate(t1, t2);
        let drift: Vec<Real> = self
            .x
            .iter()
            .zip(self.variance_values.iter())
            .map(|(x, hv)| x + phi - q - hv)
            .collect();
        self.map_t.axpyb(&drift, &self.dx_map, &self.dxx_map, &[]);
    }
}

// ── Composite operator ────────────────────────────────────────────────────────

/// Heston-Hull-White operator; directions are `ln S`, `v` and the
/// short-rate state.
#[derive(Debug, Clone)]
pub struct FdmHestonHullWhiteOp {
    dx: EquityPart,
    dy_map: TripleBandLinearOp,
    hull_white_op: FdmHullWhiteOp,
    heston_corr_map: NinePointLinearOp,
    equity_ir_corr_map: NinePointLinearOp,
}

impl FdmHestonHullWhiteOp {
    /// Operator for the equity/variance dynamics of `heston` and the short
    /// rate of `hull_white`, with equity/short-rate correlation
    /// `equity_short_rate_corr`.
    pub fn new(
        mesher: &dyn FdmMesher,
        heston: &HestonProcess,
        hull_white: &HullWhiteProcess,
        equity_short_rate_corr: Real,
    ) -> Result<Self> {
        ensure!(
            equity_short_rate_corr * equity_short_rate_corr + heston.rho() * heston.rho() <= 1.0,
            "correlation matrix has negative eigenvalues"
        );
        ensure!(
            mesher.layout().dim().len() == 3,
            "three-dimensional mesher required"
        );
        // the short rate is fitted to the equity discount curve
        let hull_white = HullWhiteProcess::new(
            Arc::clone(heston.risk_free_rate()),
            hull_white.a(),
            hull_white.sigma(),
        )?;

        let v = mesher.locations(1);
        let sigma = heston.sigma();
        let dy_map = SecondDerivativeOp::new(1, mesher)
            .mult(&(&v * (0.5 * sigma * sigma)))
            .add(&FirstDerivativeOp::new(1, mesher).mult(&v.map(|vi| heston.kappa() * (heston.theta() - vi))));
        let heston_corr_map =
            SecondOrderMixedDerivativeOp::new(0, 1, mesher).mult(&(&v * (heston.rho() * sigma)));
        let equity_ir_corr_map = SecondOrderMixedDerivativeOp::new(0, 2, mesher)
            .mult(&v.map(|vi| vi.sqrt() * hull_white.sigma() * equity_short_rate_corr));

        Ok(Self {
            dx: EquityPart::new(mesher, &hull_white, Arc::clone(heston.dividend_yield())),
            dy_map,
            hull_white_op: FdmHullWhiteOp::new(mesher, &hull_white, 2),
            heston_corr_map,
            equity_ir_corr_map,
        })
    }
}

impl FdmLinearOp for FdmHestonHullWhiteOp {
    fn apply(&self, r: &Array) -> Array {
        let directional = &(&self.dy_map.apply(r) + &self.dx.map_t.apply(r))
            + &self.hull_white_op.apply(r);
        &directional + &self.apply_mixed(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        super::sum_matrices(&self.to_matrix_decomp()?)
    }
}

impl FdmLinearOpComposite for FdmHestonHullWhiteOp {
    fn size(&self) -> Size {
        3
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        self.dx.set_time(t1, t2);
        self.hull_white_op.set_time(t1, t2)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        &self.heston_corr_map.apply(r) + &self.equity_ir_corr_map.apply(r)
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Array {
        match direction {
            0 => self.dx.map_t.apply(r),
            1 => self.dy_map.apply(r),
            2 => self.hull_white_op.apply(r),
            _ => Array::zeros(r.len()),
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, s: Real) -> Result<Array> {
        match direction {
            0 => self.dx.map_t.solve_splitting(r, s, 1.0),
            1 => self.dy_map.solve_splitting(r, s, 1.0),
            2 => self.hull_white_op.solve_splitting(2, r, s),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(0, r, s)
    }

    fn to_matrix_decomp(&self) -> Result<Vec<SparseMatrix>> {
        Ok(vec![
            self.dx.map_t.to_matrix()?,
            self.dy_map.to_matrix()?,
            self.hull_white_op.to_matrix()?,
            self.heston_corr_map.to_matrix()?,
            self.equity_ir_corr_map.to_matrix()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    fn setup() -> (FdmMesherComposite, HestonProcess, HullWhiteProcess) {
        let mesher = FdmMesherComposite::new(vec![
            Uniform1dMesher::new(3.5, 5.5, 11).unwrap().into(),
            Uniform1dMesher::new(0.0, 0.5, 7).unwrap().into(),
            Uniform1dMesher::new(-0.1, 0.2, 5).unwrap().into(),
        ])
        .unwrap();
        let rate = Arc::new(FlatForward::new(0.05));
        let heston = HestonProcess::new(
            rate.clone(),
            Arc::new(FlatForward::new(0.02)),
            100.0,
            0.04,
            1.0,
            0.03,
            0.4,
            -0.7,
        )
        .unwrap();
        let hull_white = HullWhiteProcess::new(rate, 0.00883, 0.01).unwrap();
        (mesher, heston, hull_white)
    }

    #[test]
    fn rejects_an_inconsistent_correlation() {
        let (mesher, heston, hull_white) = setup();
        assert!(FdmHestonHullWhiteOp::new(&mesher, &heston, &hull_white, -0.7).is_ok());
        assert!(FdmHestonHullWhiteOp::new(&mesher, &heston, &hull_white, 0.8).is_err());
    }

    #[test]
    fn parts_sum_to_the_full_operator() {
        let (mesher, heston, hull_white) = setup();
        let mut op = FdmHestonHullWhiteOp::new(&mesher, &heston, &hull_white, -0.5).unwrap();
        op.set_time(0.5, 0.6).unwrap();
        let s = mesher.locations(0);
        let v = mesher.locations(1);
        let z = mesher.locations(2);
        let f = Array::from_fn(s.len(), |i| (s[i] - 4.5).powi(2) * (1.0 + v[i]) * (1.0 + z[i]));

        let full = op.apply(&f);
        let parts = &(&(&op.apply_direction(0, &f) + &op.apply_direction(1, &f))
            + &op.apply_direction(2, &f))
            + &op.apply_mixed(&f);
        let dense = op.to_matrix().unwrap().mul_vec(&f);
        for i in 0..f.len() {
            assert_abs_diff_eq!(full[i], parts[i], epsilon = 1e-10);
            assert_abs_diff_eq!(full[i], dense[i], epsilon = 1e-8);
        }
        assert_eq!(op.size(), 3);
    }

    #[test]
    fn equity_drift_follows_the_short_rate() {
        let (mesher, heston, hull_white) = setup();
        let mut op = FdmHestonHullWhiteOp::new(&mesher, &heston, &hull_white, -0.5).unwrap();
        op.set_time(0.0, 0.0).unwrap();
        let s = mesher.locations(0);
        let v = mesher.locations(1);
        let z = mesher.locations(2);
        let ls = op.apply_direction(0, &s);
        let idx = mesher.layout().index(&[5, 3, 2]);
        // φ(0) = f(0, 0)
        assert_abs_diff_eq!(ls[idx], z[idx] + 0.05 - 0.02 - 0.5 * v[idx], epsilon = 1e-10);

        let ones = Array::from_element(s.len(), 1.0);
        let l1 = op.apply(&ones);
        assert_abs_diff_eq!(l1[idx], -(z[idx] + 0.05), epsilon = 1e-10);
    }
}
