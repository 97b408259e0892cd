//! Hull-White short-rate operator along one direction.
//!
//! The grid coordinate is the state `x` of `r = x + φ(t)`:
//! `L = −a x ∂ₓ + ½σ² ∂ₓₓ − (x + φ(t))`, with `φ` averaged over the step.
//!
//! Corresponds to `QuantLib::FdmHullWhiteOp`.

use super::{
    FdmLinearOp, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Size, Time};
use ql_math::{Array, SparseMatrix};
use ql_processes::HullWhiteProcess;

/// Hull-White operator; the short-rate state lives in `direction`.
#[derive(Debug, Clone)]
pub struct FdmHullWhiteOp {
    direction: Size,
    x: Array,
    dz_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
    process: HullWhiteProcess,
}

impl FdmHullWhiteOp {
    /// Operator for `process` on `mesher`.
    pub fn new(mesher: &dyn FdmMesher, process: &HullWhiteProcess, direction: Size) -> Self {
        let x = mesher.locations(direction);
        let sigma = process.sigma();
        let drift = FirstDerivativeOp::new(direction, mesher).mult(&(&x * -process.a()));
        let diffusion = SecondDerivativeOp::new(direction, mesher)
            .mult(&Array::from_element(x.len(), 0.5 * sigma * sigma));
        Self {
            direction,
            x,
            dz_map: drift.add(&diffusion),
            map_t: TripleBandLinearOp::new(direction, mesher),
            process: process.clone(),
        }
    }

    /// Direction of the short-rate state.
    pub fn direction(&self) -> Size {
        self.direction
    }
}

impl FdmLinearOp for FdmHullWhiteOp {
    fn apply(&self, r: &Array) -> Array {
        self.map_t.apply(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        self.map_t.to_matrix()
    }
}

impl FdmLinearOpComposite for FdmHullWhiteOp {
    fn size(&self) -> Size {
        1
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let phi = 0.5 * (self.process.phi(t1) + self.process.phi(t2));
        let discount: Vec<Real> = self.x.iter().map(|x| -(x + phi)).collect();
        self.map_t.axpyb(&[], &self.dz_map, &self.dz_map, &discount);
        Ok(())
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        Array::zeros(r.len())
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Array {
        if direction == self.direction {
            self.map_t.apply(r)
        } else {
            Array::zeros(r.len())
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, s: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_t.solve_splitting(r, s, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, s)
    }

    fn to_matrix_decomp(&self) -> Result<Vec<SparseMatrix>> {
        Ok(vec![self.map_t.to_matrix()?])
    }
}
