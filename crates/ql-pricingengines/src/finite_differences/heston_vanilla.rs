use super::{log_inner_value, FdGridSettings};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_instruments::{
    Dividend, Exercise, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    BlackScholesMesherParams, FdmBlackScholesMesher, FdmHestonVarianceMesher, FdmMesher,
    FdmMesherComposite,
};
use ql_methods::finite_differences::solvers::{FdmHestonSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::FdmSchemeDesc;
use ql_processes::{black_scholes_merton_process, HestonProcess};
use ql_termstructures::BlackConstantVol;
use std::sync::Arc;
use tracing::debug;

/// Fewest time horizons averaged by the variance mesher.
const MIN_VARIANCE_HORIZONS: Size = 5;

/// Finite-difference engine for vanilla options under Heston.
///
/// The grid is the tensor product of a log-spot mesher, sized with the
/// variance mesher's volatility estimate, and a variance mesher through
/// `v0`. Handles European, American and Bermudan exercise and cash
/// dividends.
#[derive(Debug, Clone)]
pub struct FdHestonVanillaEngine {
    process: Arc<HestonProcess>,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
}

impl FdHestonVanillaEngine {
    /// Engine with 100 time steps, 100 × 50 space points and the
    /// Hundsdorfer scheme.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            grid: FdGridSettings::default(),
            scheme: FdmSchemeDesc::hundsdorfer(),
        }
    }

    /// Replace the grid sizes.
    pub fn with_grid(mut self, grid: FdGridSettings) -> Self {
        self.grid = grid;
        self
    }

    /// Replace the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }

    pub(super) fn spot(&self) -> Real {
        self.process.s0()
    }

    pub(super) fn solve_with_boundary(
        &self,
        payoff: &Arc<dyn StrikedPayoff>,
        exercise: &Exercise,
        dividends: &[Dividend],
        bounds: (Option<Real>, Option<Real>),
        boundary: impl FnOnce(&dyn FdmMesher) -> FdmBoundaryConditionSet,
    ) -> Result<PricingResults> {
        self.grid.validate()?;
        ensure!(self.grid.v_grid >= 3, "at least three variance points are required");
        let maturity = exercise.last_time();
        let strike = payoff.strike();

        let variance_mesher = FdmHestonVarianceMesher::new(
            self.grid.v_grid,
            &self.process,
            maturity,
            MIN_VARIANCE_HORIZONS.max(self.grid.t_grid / 50),
            1e-4,
        )?;
        let equity_process = black_scholes_merton_process(
            self.process.s0(),
            Arc::clone(self.process.risk_free_rate()),
            Arc::clone(self.process.dividend_yield()),
            Arc::new(BlackConstantVol::new(variance_mesher.vola_estimate())),
        );
        let params = BlackScholesMesherParams::default()
            .with_bounds(bounds.0, bounds.1)
            .with_c_point(strike, 0.1)
            .with_dividends(dividends.to_vec());
        let equity_mesher =
            FdmBlackScholesMesher::new(self.grid.x_grid, &equity_process, maturity, strike, &params)?;
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::from_2d(equity_mesher, variance_mesher)?);
        debug!(
            x_grid = self.grid.x_grid,
            v_grid = self.grid.v_grid,
            t_grid = self.grid.t_grid,
            maturity,
            "Heston finite-difference grid"
        );

        let calculator = log_inner_value(payoff, &mesher);
        let condition =
            FdmStepConditionComposite::vanilla_composite(dividends, exercise, &mesher, &calculator, 0)?;
        let bc_set = boundary(mesher.as_ref());
        let desc = FdmSolverDesc {
            mesher,
            bc_set,
            condition: Arc::new(condition),
            calculator,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmHestonSolver::new(&self.process, desc, self.scheme)?;

        let (s0, v0) = (self.process.s0(), self.process.v0());
        Ok(PricingResults::from_npv(solver.value_at(s0, v0)?)
            .with_delta(solver.delta_at(s0, v0)?)
            .with_gamma(solver.gamma_at(s0, v0)?)
            .with_theta(solver.theta_at(s0, v0)?)
            .with_result("variance_delta", solver.variance_delta_at(s0, v0)?))
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        args.validate()?;
        self.solve_with_boundary(
            &args.payoff,
            &args.exercise,
            &args.dividends,
            (None, None),
            |_| FdmBoundaryConditionSet::new(),
        )
    }
}
