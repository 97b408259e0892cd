use super::{FdmSolverDesc, RollbackCore};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, fail, LazyObject, LazyState, Real};
use ql_math::interpolations::{CubicNaturalSpline, Interpolation1D};
use std::cell::RefCell;

/// Solver on a one-dimensional grid; results are read off a natural cubic
/// spline through the rolled-back values.
///
/// Corresponds to `QuantLib::Fdm1DimSolver`.
#[derive(Debug)]
pub struct Fdm1DimSolver {
    state: LazyState,
    core: RollbackCore,
    x: Vec<Real>,
    interpolation: RefCell<Option<CubicNaturalSpline>>,
}

impl Fdm1DimSolver {
    /// Solver for a one-dimensional problem.
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        ensure!(
            desc.mesher.layout().dim().len() == 1,
            "one-dimensional mesher required"
        );
        let x = desc.mesher.locations(0).to_vec();
        Ok(Self {
            state: LazyState::new(),
            core: RollbackCore::new(desc, scheme_desc, op)?,
            x,
            interpolation: RefCell::new(None),
        })
    }

    fn with_interpolation<R>(&self, f: impl FnOnce(&CubicNaturalSpline) -> R) -> Result<R> {
        self.calculate()?;
        match self.interpolation.borrow().as_ref() {
            Some(spline) => Ok(f(spline)),
            None => fail!("solver results not available"),
        }
    }

    /// Value at grid coordinate `x`.
    pub fn interpolate_at(&self, x: Real) -> Result<Real> {
        self.with_interpolation(|s| s.value(x))
    }

    /// First derivative along direction 0.
    pub fn derivative_x(&self, x: Real) -> Result<Real> {
        self.with_interpolation(|s| s.derivative(x))
    }

    /// Second derivative along direction 0.
    pub fn derivative_xx(&self, x: Real) -> Result<Real> {
        self.with_interpolation(|s| s.second_derivative(x))
    }

    /// `(V(x, t_snapshot) − V(x, 0)) / t_snapshot`.
    pub fn theta_at(&self, x: Real) -> Result<Real> {
        let value = self.interpolate_at(x)?;
        let (snapshot, t) = self.core.theta_snapshot()?;
        let later = CubicNaturalSpline::new(&self.x, snapshot.as_slice())?.value(x);
        Ok((later - value) / t)
    }
}

impl LazyObject for Fdm1DimSolver {
    fn perform_calculations(&self) -> Result<()> {
        let values = self.core.rollback()?;
        *self.interpolation.borrow_mut() = Some(CubicNaturalSpline::new(&self.x, values.as_slice())?);
        Ok(())
    }

    fn lazy_state(&self) -> &LazyState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
    use crate::finite_differences::meshers::{
        BlackScholesMesherParams, FdmBlackScholesMesher, FdmMesher, FdmMesherComposite,
    };
    use crate::finite_differences::operators::FdmBlackScholesOp;
    use crate::finite_differences::step_conditions::FdmStepConditionComposite;
    use crate::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
    use approx::assert_abs_diff_eq;
    use ql_instruments::{OptionType, Payoff, PlainVanillaPayoff};
    use ql_math::normal_cdf;
    use ql_processes::black_scholes_merton_process;
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    fn call_solver(condition: FdmStepConditionComposite) -> Fdm1DimSolver {
        let process = black_scholes_merton_process(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(BlackConstantVol::new(0.2)),
        );
        let mesher: Arc<dyn FdmMesher> = Arc::new(
            FdmMesherComposite::from_1d(
                FdmBlackScholesMesher::new(
                    200,
                    &process,
                    1.0,
                    100.0,
                    &BlackScholesMesherParams::default(),
                )
                .unwrap(),
            )
            .unwrap(),
        );
        let payoff: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));
        let calculator: Arc<dyn FdmInnerValueCalculator> =
            Arc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0));
        let op = FdmBlackScholesOp::new(mesher.as_ref(), &process, 100.0, false, None, 0);
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition: Arc::new(condition),
            calculator,
            maturity: 1.0,
            time_steps: 100,
            damping_steps: 0,
        };
        Fdm1DimSolver::new(desc, FdmSchemeDesc::douglas(), Box::new(op)).unwrap()
    }

    #[test]
    fn value_and_greeks_of_a_european_call() {
        let solver = call_solver(FdmStepConditionComposite::default());
        assert!(!solver.is_calculated());
        let x = 100.0_f64.ln();
        let (d1, d2) = (0.35, 0.15);
        let value = 100.0 * normal_cdf(d1) - 100.0 * (-0.05_f64).exp() * normal_cdf(d2);
        assert_abs_diff_eq!(solver.interpolate_at(x).unwrap(), value, epsilon = 2e-2);
        assert!(solver.is_calculated());
        // ∂V/∂x = S·Δ
        assert_abs_diff_eq!(solver.derivative_x(x).unwrap() / 100.0, normal_cdf(d1), epsilon = 5e-3);
        // Black-Scholes theta of a call, r = 0.05, σ = 0.2
        let pdf = (-0.5 * d1 * d1).exp() / (2.0 * std::f64::consts::PI).sqrt();
        let theta = -100.0 * pdf * 0.2 / 2.0 - 0.05 * 100.0 * (-0.05_f64).exp() * normal_cdf(d2);
        assert_abs_diff_eq!(solver.theta_at(x).unwrap(), theta, epsilon = 0.1);
    }

    #[test]
    fn theta_needs_a_positive_first_stopping_time() {
        let solver = call_solver(FdmStepConditionComposite::new(vec![0.0], Vec::new()));
        assert!(solver.interpolate_at(4.6).is_ok());
        assert!(solver.theta_at(4.6).is_err());
    }
}
