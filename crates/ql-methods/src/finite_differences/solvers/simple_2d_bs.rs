use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBlackScholesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;

/// Black-Scholes PDE along direction 0 of a two-dimensional grid whose
/// second direction is a state variable without dynamics, such as the
/// number of swing rights used.
#[derive(Debug)]
pub struct FdmSimple2dBSSolver {
    solver: Fdm2DimSolver,
}

impl FdmSimple2dBSSolver {
    /// Black-Scholes solver with an extra, non-diffusing state direction.
    pub fn new(
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmBlackScholesOp::new(desc.mesher.as_ref(), process, strike, false, None, 0);
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at spot `s` and state `a`.
    pub fn value_at(&self, s: Real, a: Real) -> Result<Real> {
        self.solver.interpolate_at(s.ln(), a)
    }

    /// Central difference in spot with bump `eps`.
    pub fn delta_at(&self, s: Real, a: Real, eps: Real) -> Result<Real> {
        Ok((self.value_at(s + eps, a)? - self.value_at(s - eps, a)?) / (2.0 * eps))
    }

    /// Second derivative in spot.
    pub fn gamma_at(&self, s: Real, a: Real, eps: Real) -> Result<Real> {
        let up = self.value_at(s + eps, a)?;
        let down = self.value_at(s - eps, a)?;
        Ok((up + down - 2.0 * self.value_at(s, a)?) / (eps * eps))
    }

    /// One-day theta.
    pub fn theta_at(&self, s: Real, a: Real) -> Result<Real> {
        self.solver.theta_at(s.ln(), a)
    }
}
