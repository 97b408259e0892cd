use super::{
    barrier_bounds, in_out_parity, rebate_boundary, FdGridSettings, FdHestonVanillaEngine,
};
use ql_core::{ensure, errors::Result, Real};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, CashOrNothingPayoff, Dividend, Exercise, ExerciseType,
    OptionType, PricingEngine, PricingResults, StrikedPayoff,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::FdmSchemeDesc;
use ql_processes::HestonProcess;
use std::sync::Arc;

/// Finite-difference engine for single-barrier options under Heston.
///
/// Knock-outs put a Dirichlet rebate condition on the barrier edge of the
/// log-spot direction; knock-ins go through in/out parity.
#[derive(Debug, Clone)]
pub struct FdHestonBarrierEngine {
    vanilla: FdHestonVanillaEngine,
}

impl FdHestonBarrierEngine {
    /// Engine with default grid sizes and the Hundsdorfer scheme.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            vanilla: FdHestonVanillaEngine::new(process),
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

impl PricingEngine<BarrierOptionArguments> for FdHestonBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        args.validate()?;
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            "only european style barrier options are supported"
        );
        ensure!(!args.triggered(self.vanilla.spot()), "barrier touched");

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
