use super::{log_inner_value, FdGridSettings};
use ql_core::{errors::Result, Real};
use ql_instruments::{
    Dividend, Exercise, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    BlackScholesMesherParams, FdmBlackScholesMesher, FdmMesher, FdmMesherComposite,
};
use ql_methods::finite_differences::solvers::{FdmBlackScholesSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::FdmSchemeDesc;
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// Finite-difference engine for vanilla options under Black-Scholes.
///
/// Handles European, American and Bermudan exercise and discrete cash
/// dividends. With [`with_local_vol`](Self::with_local_vol) the diffusion
/// coefficient is read from the process' local volatility surface.
#[derive(Debug, Clone)]
pub struct FdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
    local_vol: bool,
    illegal_local_vol_overwrite: Option<Real>,
}

impl FdBlackScholesVanillaEngine {
    /// Engine with 100 time steps, 100 spot points and the Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            grid: FdGridSettings::default(),
            scheme: FdmSchemeDesc::douglas(),
            local_vol: false,
            illegal_local_vol_overwrite: None,
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

    /// Use the local volatility of the process. Where it cannot be
    /// evaluated, `illegal_overwrite` replaces it when given; otherwise the
    /// error is returned.
    pub fn with_local_vol(mut self, illegal_overwrite: Option<Real>) -> Self {
        self.local_vol = true;
        self.illegal_local_vol_overwrite = illegal_overwrite;
        self
    }

    /// Roll `payoff` back on a log-spot grid bounded by `bounds`, with the
    /// boundary conditions `boundary` builds on that grid.
    pub(super) fn solve_with_boundary(
        &self,
        payoff: &Arc<dyn StrikedPayoff>,
        exercise: &Exercise,
        dividends: &[Dividend],
        bounds: (Option<Real>, Option<Real>),
        boundary: impl FnOnce(&dyn FdmMesher) -> FdmBoundaryConditionSet,
    ) -> Result<PricingResults> {
        self.grid.validate()?;
        let maturity = exercise.last_time();
        let strike = payoff.strike();
        let params = BlackScholesMesherParams::default()
            .with_bounds(bounds.0, bounds.1)
            .with_c_point(strike, 0.1)
            .with_dividends(dividends.to_vec());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::from_1d(
            FdmBlackScholesMesher::new(self.grid.x_grid, &self.process, maturity, strike, &params)?,
        )?);
        debug!(
            x_grid = self.grid.x_grid,
            t_grid = self.grid.t_grid,
            maturity,
            "Black-Scholes finite-difference grid"
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
        let solver = FdmBlackScholesSolver::new(
            &self.process,
            strike,
            desc,
            self.scheme,
            self.local_vol,
            self.illegal_local_vol_overwrite,
        )?;

        let spot = self.process.spot();
        Ok(PricingResults::from_npv(solver.value_at(spot)?)
            .with_delta(solver.delta_at(spot)?)
            .with_gamma(solver.gamma_at(spot)?)
            .with_theta(solver.theta_at(spot)?))
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesVanillaEngine {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::AnalyticEuropeanEngine;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{OptionType, PlainVanillaPayoff};
    use ql_processes::black_scholes_merton_process;
    use ql_termstructures::{BlackConstantVol, FlatForward, LocalConstantVol};
    use tracing_test::traced_test;

    fn process() -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(black_scholes_merton_process(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            Arc::new(BlackConstantVol::new(0.25)),
        ))
    }

    fn args(option_type: OptionType, exercise: Exercise) -> VanillaOptionArguments {
        VanillaOptionArguments::new(Arc::new(PlainVanillaPayoff::new(option_type, 100.0)), exercise)
    }

    #[test]
    #[traced_test]
    fn european_matches_the_closed_form() {
        let fd = FdBlackScholesVanillaEngine::new(process())
            .with_grid(FdGridSettings::default().with_x_grid(200));
        let analytic = AnalyticEuropeanEngine::new(process());
        for option_type in [OptionType::Call, OptionType::Put] {
            let a = args(option_type, Exercise::european(1.0).unwrap());
            let expected = analytic.calculate(&a).unwrap();
            let r = fd.calculate(&a).unwrap();
            assert_abs_diff_eq!(r.npv, expected.npv, epsilon = 1e-2);
            assert_abs_diff_eq!(r.delta.unwrap(), expected.delta.unwrap(), epsilon = 1e-3);
            assert_abs_diff_eq!(r.gamma.unwrap(), expected.gamma.unwrap(), epsilon = 1e-3);
            assert_abs_diff_eq!(r.theta.unwrap(), expected.theta.unwrap(), epsilon = 5e-2);
        }
        assert!(logs_contain("Black-Scholes finite-difference grid"));
    }

    #[test]
    fn local_vol_flag_with_a_flat_surface_changes_nothing() {
        let flat = Arc::new(
            black_scholes_merton_process(
                100.0,
                Arc::new(FlatForward::new(0.05)),
                Arc::new(FlatForward::new(0.02)),
                Arc::new(BlackConstantVol::new(0.25)),
            )
            .with_local_vol(Arc::new(LocalConstantVol::new(0.25))),
        );
        let a = args(OptionType::Put, Exercise::american(0.0, 1.0).unwrap());
        let plain = FdBlackScholesVanillaEngine::new(flat.clone()).calculate(&a).unwrap();
        let local = FdBlackScholesVanillaEngine::new(flat)
            .with_local_vol(None)
            .calculate(&a)
            .unwrap();
        assert_abs_diff_eq!(plain.npv, local.npv, epsilon = 1e-8);
    }

    #[test]
    fn dividends_lower_a_call() {
        let engine = FdBlackScholesVanillaEngine::new(process());
        let plain = args(OptionType::Call, Exercise::european(1.0).unwrap());
        let with_div = plain.clone().with_dividends(vec![Dividend::new(0.5, 3.0)]);
        let base = engine.calculate(&plain).unwrap().npv;
        let lowered = engine.calculate(&with_div).unwrap().npv;
        assert!(lowered < base - 1.0, "{lowered} vs {base}");
    }
}
