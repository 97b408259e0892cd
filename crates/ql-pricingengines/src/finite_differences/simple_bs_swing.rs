use super::{log_inner_value, FdGridSettings};
use ql_core::{ensure, errors::Result, Real};
use ql_instruments::{PricingEngine, PricingResults, SwingOptionArguments};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    BlackScholesMesherParams, FdmBlackScholesMesher, FdmMesher, FdmMesherComposite,
    Uniform1dMesher,
};
use ql_methods::finite_differences::solvers::{FdmSimple2dBSSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::{
    FdmSimpleSwingCondition, FdmStepConditionComposite, StepCondition,
};
use ql_methods::finite_differences::utilities::FdmZeroInnerValue;
use ql_methods::FdmSchemeDesc;
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// Finite-difference engine for swing options under Black-Scholes.
///
/// The second grid direction counts the rights used so far, from `0` to
/// the maximum. Nothing is paid at expiry; all value comes from the swing
/// exercise decisions.
#[derive(Debug, Clone)]
pub struct FdSimpleBSSwingEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
}

impl FdSimpleBSSwingEngine {
    /// Engine with 50 time steps, 100 spot points and the Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            grid: FdGridSettings::default().with_t_grid(50),
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Replace the grid sizes. `v_grid` is ignored.
    pub fn with_grid(mut self, grid: FdGridSettings) -> Self {
        self.grid = grid;
        self
    }

    /// Replace the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }
}

impl PricingEngine<SwingOptionArguments> for FdSimpleBSSwingEngine {
    fn calculate(&self, args: &SwingOptionArguments) -> Result<PricingResults> {
        args.validate()?;
        self.grid.validate()?;
        let max_rights = args.max_exercise_rights;
        ensure!(max_rights > 0, "at least one exercise right is required");

        let times = args.exercise_times().to_vec();
        let maturity = args.exercise.last_time();
        let strike = args.payoff.strike();

        let params = BlackScholesMesherParams::default().with_c_point(strike, 0.1);
        let equity_mesher =
            FdmBlackScholesMesher::new(self.grid.x_grid, &self.process, maturity, strike, &params)?;
        let rights_mesher = Uniform1dMesher::new(0.0, max_rights as Real, max_rights + 1)?;
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::from_2d(equity_mesher, rights_mesher)?);
        debug!(
            x_grid = self.grid.x_grid,
            t_grid = self.grid.t_grid,
            max_rights,
            min_rights = args.min_exercise_rights,
            "swing finite-difference grid"
        );

        let exercise_value = log_inner_value(&args.payoff, &mesher);
        let swing = FdmSimpleSwingCondition::new(
            times.clone(),
            Arc::clone(&mesher),
            exercise_value,
            1,
            args.min_exercise_rights,
        )?;
        let condition =
            FdmStepConditionComposite::new(times, vec![Arc::new(swing) as Arc<dyn StepCondition>]);
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition: Arc::new(condition),
            calculator: Arc::new(FdmZeroInnerValue),
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmSimple2dBSSolver::new(&self.process, strike, desc, self.scheme)?;

        let spot = self.process.spot();
        let eps = 0.01 * spot;
        Ok(PricingResults::from_npv(solver.value_at(spot, 0.0)?)
            .with_delta(solver.delta_at(spot, 0.0, eps)?)
            .with_gamma(solver.gamma_at(spot, 0.0, eps)?)
            .with_theta(solver.theta_at(spot, 0.0)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use crate::finite_differences::FdBlackScholesVanillaEngine;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{
        Exercise, OptionType, PlainVanillaPayoff, StrikedPayoff, VanillaOptionArguments,
    };
    use ql_processes::black_scholes_merton_process;
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use tracing_test::traced_test;

    const S: Real = 30.0;
    const K: Real = 30.0;
    const R: Real = 0.14;
    const Q: Real = 0.02;
    const VOL: Real = 0.4;

    fn process() -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(black_scholes_merton_process(
            S,
            Arc::new(FlatForward::new(R)),
            Arc::new(FlatForward::new(Q)),
            Arc::new(BlackConstantVol::new(VOL)),
        ))
    }

    fn monthly() -> Vec<Real> {
        (1..=12).map(|m| m as Real / 12.0).collect()
    }

    fn put() -> Arc<dyn StrikedPayoff> {
        Arc::new(PlainVanillaPayoff::new(OptionType::Put, K))
    }

    fn swing(min: usize, max: usize) -> Real {
        let args = SwingOptionArguments::new(
            put(),
            Exercise::bermudan(monthly()).unwrap(),
            min,
            max,
        );
        FdSimpleBSSwingEngine::new(process())
            .with_grid(FdGridSettings::default().with_t_grid(50).with_x_grid(200))
            .calculate(&args)
            .unwrap()
            .npv
    }

    fn european(t: Real) -> Real {
        black_scholes_merton(OptionType::Put, S, K, R, Q, VOL, t).npv
    }

    #[test]
    fn swing_is_bounded_by_bermudan_and_european_strips() {
        let bermudan = FdBlackScholesVanillaEngine::new(process())
            .with_grid(FdGridSettings::default().with_t_grid(50).with_x_grid(200))
            .calculate(&VanillaOptionArguments::new(
                put(),
                Exercise::bermudan(monthly()).unwrap(),
            ))
            .unwrap()
            .npv;
        let times = monthly();
        for rights in [1, 3, 6, 12] {
            let price = swing(0, rights);
            let upper = rights as Real * bermudan;
            let lower: Real = times[times.len() - rights..].iter().map(|&t| european(t)).sum();
            assert!(price <= upper + 2e-2, "{rights} rights: {price} > {upper}");
            assert!(price >= lower - 2e-2, "{rights} rights: {price} < {lower}");
        }
    }

    #[test]
    #[traced_test]
    fn forced_exercise_everywhere_is_a_strip_of_europeans() {
        let strip: Real = monthly().into_iter().map(european).sum();
        let price = swing(12, 12);
        assert_abs_diff_eq!(price, strip, epsilon = 0.01 * strip);
        assert!(logs_contain("swing finite-difference grid"));
    }

    #[test]
    fn more_rights_are_worth_more() {
        assert!(swing(0, 4) > swing(0, 2));
    }

    #[test]
    fn zero_rights_are_rejected() {
        let args = SwingOptionArguments::new(put(), Exercise::bermudan(monthly()).unwrap(), 0, 0);
        assert!(FdSimpleBSSwingEngine::new(process()).calculate(&args).is_err());
    }
}
