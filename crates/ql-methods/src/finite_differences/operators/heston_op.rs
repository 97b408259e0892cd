//! Heston operator in (log-spot, variance).
//!
//! `L = (r − q − ½v) ∂ₓ + ½v ∂ₓₓ + κ(θ − v) ∂ᵥ + ½σ²v ∂ᵥᵥ + ρσv ∂ₓᵥ − r`.
//! The discount term is split evenly between the two directional parts.
//! On the log-spot boundaries the `−½v` drift correction is dropped
//! together with the second derivative.

use super::{
    FdmLinearOp, FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp,
    SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Size, Time};
use ql_math::{Array, SparseMatrix};
use ql_processes::HestonProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

// ── Equity direction ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct EquityPart {
    variance_values: Array,
    dx_map: FirstDerivativeOp,
    dxx_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
}

impl EquityPart {
    fn new(mesher: &dyn FdmMesher, process: &HestonProcess) -> Self {
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
            variance_values,
            dx_map: FirstDerivativeOp::new(0, mesher),
            dxx_map: SecondDerivativeOp::new(0, mesher).mult(&(&v * 0.5)),
            map_t: TripleBandLinearOp::new(0, mesher),
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
        }
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2);
        let drift: Vec<Real> = self.variance_values.iter().map(|hv| r - q - hv).collect();
        self.map_t
            .axpyb(&drift, &self.dx_map, &self.dxx_map, &[-0.5 * r]);
    }
}

// ── Variance direction ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct VariancePart {
    dy_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
    r_ts: Arc<dyn YieldTermStructure>,
}

impl VariancePart {
    fn new(mesher: &dyn FdmMesher, process: &HestonProcess) -> Self {
        let v = mesher.locations(1);
        let sigma = process.sigma();
        let diffusion = SecondDerivativeOp::new(1, mesher).mult(&(&v * (0.5 * sigma * sigma)));
        let drift = FirstDerivativeOp::new(1, mesher)
            .mult(&v.map(|vi| process.kappa() * (process.theta() - vi)));
        Self {
            dy_map: diffusion.add(&drift),
            map_t: TripleBandLinearOp::new(1, mesher),
            r_ts: Arc::clone(process.risk_free_rate()),
        }
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.r_ts.forward_rate(t1, t2);
        self.map_t.axpyb(&[], &self.dy_map, &self.dy_map, &[-0.5 * r]);
    }
}

// ── Composite operator ────────────────────────────────────────────────────────

/// Heston operator on a (log-spot, variance) mesher.
///
/// Corresponds to `QuantLib::FdmHestonOp`.
#[derive(Debug, Clone)]
pub struct FdmHestonOp {
    dx: EquityPart,
    dy: VariancePart,
    correlation: NinePointLinearOp,
}

impl FdmHestonOp {
    /// Operator for `process`; direction 0 is `ln S`, direction 1 is `v`.
    pub fn new(mesher: &dyn FdmMesher, process: &HestonProcess) -> Self {
        let rho_sigma = process.rho() * process.sigma();
        let correlation = SecondOrderMixedDerivativeOp::new(0, 1, mesher)
            .mult(&(&mesher.locations(1) * rho_sigma));
        Self {
            dx: EquityPart::new(mesher, process),
            dy: VariancePart::new(mesher, process),
            correlation,
        }
    }
}

impl FdmLinearOp for FdmHestonOp {
    fn apply(&self, r: &Array) -> Array {
        &(&self.dy.map_t.apply(r) + &self.dx.map_t.apply(r)) + &self.correlation.apply(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        super::sum_matrices(&self.to_matrix_decomp()?)
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> Size {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        self.dx.set_time(t1, t2);
        self.dy.set_time(t1, t2);
        Ok(())
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        self.correlation.apply(r)
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Array {
        match direction {
            0 => self.dx.map_t.apply(r),
            1 => self.dy.map_t.apply(r),
            _ => Array::zeros(r.len()),
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, s: Real) -> Result<Array> {
        match direction {
            0 => self.dx.map_t.solve_splitting(r, s, 1.0),
            1 => self.dy.map_t.solve_splitting(r, s, 1.0),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(0, r, s)
    }

    fn to_matrix_decomp(&self) -> Result<Vec<SparseMatrix>> {
        Ok(vec![
            self.dx.map_t.to_matrix()?,
            self.dy.map_t.to_matrix()?,
            self.correlation.to_matrix()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    fn setup() -> (FdmMesherComposite, HestonProcess) {
        let mesher = FdmMesherComposite::from_2d(
            Uniform1dMesher::new(3.5, 5.5, 21).unwrap(),
            Uniform1dMesher::new(0.0, 0.5, 11).unwrap(),
        )
        .unwrap();
        let process = HestonProcess::new(
            Arc::new(FlatForward::new(0.04)),
            Arc::new(FlatForward::new(0.01)),
            100.0,
            0.04,
            1.5,
            0.04,
            0.3,
            -0.6,
        )
        .unwrap();
        (mesher, process)
    }

    #[test]
    fn parts_sum_to_the_full_operator() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.2, 0.3).unwrap();
        let x = mesher.locations(0);
        let v = mesher.locations(1);
        let f = Array::from_fn(x.len(), |i| (x[i] - 4.5).powi(2) * (1.0 + v[i]));
        let full = op.apply(&f);
        let parts = &(&op.apply_direction(0, &f) + &op.apply_direction(1, &f)) + &op.apply_mixed(&f);
        let dense = op.to_matrix().unwrap().mul_vec(&f);
        for i in 0..f.len() {
            assert_abs_diff_eq!(full[i], parts[i], epsilon = 1e-10);
            assert_abs_diff_eq!(full[i], dense[i], epsilon = 1e-8);
        }
        assert_eq!(op.to_matrix_decomp().unwrap().len(), 3);
    }

    #[test]
    fn constants_are_discounted() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.0, 0.5).unwrap();
        let l1 = op.apply(&Array::from_element(21 * 11, 1.0));
        for i in 0..l1.len() {
            assert_abs_diff_eq!(l1[i], -0.04, epsilon = 1e-12);
        }
    }

    #[test]
    fn interior_drift_of_log_spot() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.0, 1.0).unwrap();
        let x = mesher.locations(0);
        let v = mesher.locations(1);
        let lx = op.apply_direction(0, &x);
        let idx = mesher.layout().index(&[10, 4]);
        assert_abs_diff_eq!(lx[idx], 0.04 - 0.01 - 0.5 * v[idx] - 0.02 * x[idx], epsilon = 1e-10);
        let edge = mesher.layout().index(&[0, 4]);
        assert_abs_diff_eq!(lx[edge], 0.04 - 0.01 - 0.02 * x[edge], epsilon = 1e-10);
    }
}
