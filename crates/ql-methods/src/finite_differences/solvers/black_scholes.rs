use super::{Fdm1DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBlackScholesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;

/// Black-Scholes PDE on a log-spot grid; reports value and greeks in spot
/// terms.
#[derive(Debug)]
pub struct FdmBlackScholesSolver {
    solver: Fdm1DimSolver,
}

impl FdmBlackScholesSolver {
    /// `local_vol` switches the operator to the process's local volatility;
    /// `illegal_local_vol_overwrite` replaces local volatilities that fail
    /// to evaluate.
    pub fn new(
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
    ) -> Result<Self> {
        let op = FdmBlackScholesOp::new(
            desc.mesher.as_ref(),
            process,
            strike,
            local_vol,
            illegal_local_vol_overwrite,
            0,
        );
        Ok(Self {
            solver: Fdm1DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at spot `s`.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        self.solver.interpolate_at(s.ln())
    }

    /// First derivative in spot.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(s.ln())? / s)
    }

    /// Second derivative in spot.
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        let x = s.ln();
        Ok((self.solver.derivative_xx(x)? - self.solver.derivative_x(x)?) / (s * s))
    }

    /// One-day theta.
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        self.solver.theta_at(s.ln())
    }
}
