//! Black-Scholes operator in log-spot.
//!
//! `L = (r − q − ½σ²) ∂ₓ + ½σ² ∂ₓₓ − r` with `x = ln S`. The variance is
//! either the Black forward variance at the strike over the current step or
//! the local variance `σ_loc(t, S)²` at mid-step.

use super::{
    FdmLinearOp, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Size, Time, QL_EPSILON};
use ql_math::{Array, SparseMatrix};
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackVolTermStructure, LocalVolTermStructure, YieldTermStructure};
use std::sync::Arc;
use tracing::trace;

/// Log-spot Black-Scholes operator along one direction.
///
/// Corresponds to `QuantLib::FdmBlackScholesOp`.
#[derive(Debug, Clone)]
pub struct FdmBlackScholesOp {
    direction: Size,
    strike: Real,
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    vol_ts: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
    illegal_local_vol_overwrite: Option<Real>,
    x: Array,
    dx_map: FirstDerivativeOp,
    dxx_map: SecondDerivativeOp,
    map_t: TripleBandLinearOp,
}

impl FdmBlackScholesOp {
    /// Operator for `process` along `direction` of `mesher`.
    ///
    /// With `local_vol` the diffusion uses the process's local volatility;
    /// where it cannot be evaluated, `illegal_local_vol_overwrite` (if
    /// given) replaces it instead of failing the step.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
        direction: Size,
    ) -> Self {
        Self {
            direction,
            strike,
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            vol_ts: Arc::clone(process.black_volatility()),
            local_vol: local_vol.then(|| process.local_volatility()),
            illegal_local_vol_overwrite,
            x: mesher.locations(direction).exp(),
            dx_map: FirstDerivativeOp::new(direction, mesher),
            dxx_map: SecondDerivativeOp::new(direction, mesher),
            map_t: TripleBandLinearOp::new(direction, mesher),
        }
    }

    fn local_variance(&self, lv: &dyn LocalVolTermStructure, t: Time, s: Real) -> Result<Real> {
        match lv.local_vol(t, s) {
            Ok(sigma) => Ok(sigma * sigma),
            Err(e) => match self.illegal_local_vol_overwrite {
                Some(sigma) => {
                    trace!(t, s, error = %e, "local volatility overwritten");
                    Ok(sigma * sigma)
                }
                None => Err(e),
            },
        }
    }
}

impl FdmLinearOp for FdmBlackScholesOp {
    fn apply(&self, r: &Array) -> Array {
        self.map_t.apply(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        self.map_t.to_matrix()
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> Size {
        1
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2);

        if let Some(lv) = &self.local_vol {
            let t = 0.5 * (t1 + t2);
            let v = self
                .x
                .iter()
                .map(|&s| self.local_variance(lv.as_ref(), t, s))
                .collect::<Result<Array>>()?;
            let drift: Vec<Real> = v.iter().map(|vi| r - q - 0.5 * vi).collect();
            let diffusion = self.dxx_map.mult(&(&v * 0.5));
            self.map_t.axpyb(&drift, &self.dx_map, &diffusion, &[-r]);
        } else {
            let vv = if t2 - t1 > QL_EPSILON {
                self.vol_ts.black_forward_variance(t1, t2, self.strike)? / (t2 - t1)
            } else {
                self.vol_ts.black_vol(t1, self.strike).powi(2)
            };
            let diffusion = self
                .dxx_map
                .mult(&Array::from_element(self.x.len(), 0.5 * vv));
            self.map_t
                .axpyb(&[r - q - 0.5 * vv], &self.dx_map, &diffusion, &[-r]);
        }
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
