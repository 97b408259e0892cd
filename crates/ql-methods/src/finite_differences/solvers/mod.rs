//! Backward solvers.
//!
//! [`FiniteDifferenceModel`] drives a scheme through time and
//! [`FdmBackwardSolver`] picks the scheme. [`Fdm1DimSolver`] and
//! [`Fdm2DimSolver`] add initial values, a snapshot for theta and spline
//! interpolation of the result; the model-specific solvers on top of them
//! translate spot and variance into grid coordinates and greeks.

// ── Modules ───────────────────────────────────────────────────────────────────

mod backward_solver;
mod black_scholes;
mod fdm_1dim;
mod fdm_2dim;
mod heston;
mod model;
mod simple_2d_bs;

pub use backward_solver::FdmBackwardSolver;
pub use black_scholes::FdmBlackScholesSolver;
pub use fdm_1dim::Fdm1DimSolver;
pub use fdm_2dim::Fdm2DimSolver;
pub use heston::FdmHestonSolver;
pub use model::FiniteDifferenceModel;
pub use simple_2d_bs::FdmSimple2dBSSolver;

use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{
    FdmSnapshotCondition, FdmStepConditionComposite,
};
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{ensure, errors::Result, Size, Time};
use ql_math::Array;
use std::cell::RefCell;
use std::sync::Arc;

// ── Solver description ────────────────────────────────────────────────────────

/// Everything a solver needs besides the operator and the scheme.
#[derive(Debug)]
pub struct FdmSolverDesc {
    /// Grid of the problem.
    pub mesher: Arc<dyn FdmMesher>,
    /// Boundary conditions.
    pub bc_set: FdmBoundaryConditionSet,
    /// Conditions applied while rolling back.
    pub condition: Arc<FdmStepConditionComposite>,
    /// Payoff at maturity.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Maturity of the problem.
    pub maturity: Time,
    /// Number of time steps.
    pub time_steps: Size,
    /// Implicit Euler steps taken before the main scheme.
    pub damping_steps: Size,
}

// ── Shared rollback ───────────────────────────────────────────────────────────

/// Days per year used to place the theta snapshot.
const THETA_HORIZON: Time = 1.0 / 365.0;

/// The rollback shared by the one- and two-dimensional solvers.
#[derive(Debug)]
pub(crate) struct RollbackCore {
    backward: RefCell<FdmBackwardSolver>,
    theta_condition: Arc<FdmSnapshotCondition>,
    conditions: Arc<FdmStepConditionComposite>,
    initial_values: Array,
    maturity: Time,
    time_steps: Size,
    damping_steps: Size,
}

impl RollbackCore {
    pub(crate) fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        ensure!(desc.maturity > 0.0, "maturity must be positive, got {}", desc.maturity);
        ensure!(desc.time_steps > 0, "at least one time step required");

        let first_stop = desc
            .condition
            .stopping_times()
            .first()
            .copied()
            .unwrap_or(desc.maturity);
        let theta_condition = Arc::new(FdmSnapshotCondition::new(
            0.99 * THETA_HORIZON.min(first_stop),
        ));
        let conditions = Arc::new(FdmStepConditionComposite::join_conditions(
            theta_condition.clone(),
            desc.condition,
        ));

        let layout = desc.mesher.layout();
        let mut initial_values = Array::zeros(layout.size());
        for iter in layout.iter() {
            initial_values[iter.index()] = desc.calculator.avg_inner_value(&iter, desc.maturity);
        }

        let backward = FdmBackwardSolver::new(
            op,
            desc.bc_set,
            Some(conditions.clone()),
            scheme_desc,
        );
        Ok(Self {
            backward: RefCell::new(backward),
            theta_condition,
            conditions,
            initial_values,
            maturity: desc.maturity,
            time_steps: desc.time_steps,
            damping_steps: desc.damping_steps,
        })
    }

    /// Values today.
    pub(crate) fn rollback(&self) -> Result<Array> {
        let mut rhs = self.initial_values.clone();
        self.backward.borrow_mut().rollback(
            &mut rhs,
            self.maturity,
            0.0,
            self.time_steps,
            self.damping_steps,
        )?;
        Ok(rhs)
    }

    /// Snapshot values and the snapshot time; fails if a stopping time
    /// falls on today.
    pub(crate) fn theta_snapshot(&self) -> Result<(Array, Time)> {
        ensure!(
            self.conditions.stopping_times().first().map_or(false, |&t| t > 0.0),
            "stopping time at zero: can't calculate theta"
        );
        Ok((self.theta_condition.values()?, self.theta_condition.time()))
    }
}
