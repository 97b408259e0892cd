use super::{
    barrier_bounds, in_out_parity, rebate_boundary, FdBlackScholesVanillaEngine, FdGridSettings,
};
use ql_core::{ensure, errors::Result, Real};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, CashOrNothingPayoff, Dividend, Exercise, ExerciseType,
    OptionType, PricingEngine, PricingResults, StrikedPayoff,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::FdmSchemeDesc;
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Finite-difference engine for single-barrier options under
/// Black-Scholes.
///
/// A knock-out option is solved on a grid ending at the barrier, where a
/// Dirichlet condition pays the rebate. A knock-in option is priced by
/// in/out parity: the vanilla, minus the knock-out, plus the value of
/// receiving the rebate at expiry if the barrier was never reached.
#[derive(Debug, Clone)]
pub struct FdBlackScholesBarrierEngine {
    vanilla: FdBlackScholesVanillaEngine,
    spot: Real,
}

impl FdBlackScholesBarrierEngine {
    /// Engine with default grid sizes and the Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        let spot = process.spot();
        Self {
            vanilla: FdBlackScholesVanillaEngine::new(process),
            spot,
        }
    }

    /// Replace the grid sizes.
    pub fn with_grid(mut self, grid: FdGridSettings) -> Self {
        self.vanilla = self.vanilla.with_grid(grid);
        self
    }

    /// Replace the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.vanilla = self.vanilla.with_scheme(scheme);
        self
    }

    /// Use the local volatility of the process, see
    /// [`FdBlackScholesVanillaEngine::with_local_vol`].
    pub fn with_local_vol(mut self, illegal_overwrite: Option<Real>) -> Self {
        self.vanilla = self.vanilla.with_local_vol(illegal_overwrite);
        self
    }

    fn knock_out(
        &self,
        payoff: &Arc<dyn StrikedPayoff>,
        exercise: &Exercise,
        dividends: &[Dividend],
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
    ) -> Result<PricingResults> {
        let bounds = barrier_bounds(barrier_type, barrier);
        self.vanilla
            .solve_with_boundary(payoff, exercise, dividends, bounds, |mesher| {
                rebate_boundary(mesher, barrier_type, rebate)
            })
    }
}

impl PricingEngine<BarrierOptionArguments> for FdBlackScholesBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        args.validate()?;
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            "only european style barrier options are supported"
        );
        ensure!(!args.triggered(self.spot), "barrier touched");

        let out_type = args.barrier_type.knock_out();
        if !args.barrier_type.is_knock_in() {
            return self.knock_out(
                &args.payoff,
                &args.exercise,
                &args.dividends,
                out_type,
                args.barrier,
                args.rebate,
            );
        }

        let vanilla = self.vanilla.solve_with_boundary(
            &args.payoff,
            &args.exercise,
            &args.dividends,
            (None, None),
            |_| FdmBoundaryConditionSet::new(),
        )?;
        let out = self.knock_out(
            &args.payoff,
            &args.exercise,
            &args.dividends,
            out_type,
            args.barrier,
            0.0,
        )?;
        let rebate = if args.rebate > 0.0 {
            let cash: Arc<dyn StrikedPayoff> =
                Arc::new(CashOrNothingPayoff::new(OptionType::Call, 0.0, args.rebate));
            Some(self.knock_out(
                &cash,
                &args.exercise,
                &args.dividends,
                out_type,
                args.barrier,
                0.0,
            )?)
        } else {
            None
        };
        Ok(in_out_parity(&vanilla, &out, rebate.as_ref()))
    }
}
