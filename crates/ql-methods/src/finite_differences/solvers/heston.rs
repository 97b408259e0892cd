use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, Real};
use ql_processes::HestonProcess;

/// Heston PDE on a (log-spot, variance) grid.
///
/// Corresponds to `QuantLib::FdmHestonSolver`.
#[derive(Debug)]
pub struct FdmHestonSolver {
    solver: Fdm2DimSolver,
}

impl FdmHestonSolver {
    /// Rolls the problem in `desc` back under the Heston dynamics of `process`.
    pub fn new(
        process: &HestonProcess,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmHestonOp::new(desc.mesher.as_ref(), process);
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.interpolate_at(s.ln(), v)
    }

    /// First derivative in spot.
    pub fn delta_at(&self, s: Real, v: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(s.ln(), v)? / s)
    }

    /// Second derivative in spot.
    pub fn gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        let x = s.ln();
        Ok((self.solver.derivative_xx(x, v)? - self.solver.derivative_x(x, v)?) / (s * s))
    }

    /// Sensitivity to the variance coordinate.
    pub fn variance_delta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.derivative_y(s.ln(), v)
    }

    /// One-day theta.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.theta_at(s.ln(), v)
    }
}
