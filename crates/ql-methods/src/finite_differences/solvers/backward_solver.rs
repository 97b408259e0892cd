use super::model::FiniteDifferenceModel;
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::{
    CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmScheme,
    FdmSchemeDesc, FdmSchemeKind, HundsdorferScheme, ImplicitEulerScheme, MethodOfLinesScheme,
    ModifiedCraigSneydScheme, TrBDF2Scheme,
};
use crate::finite_differences::step_conditions::{FdmStepConditionComposite, StepCondition};
use ql_core::{errors::Result, Real, Size, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::debug;

/// Rolls values back with the scheme selected by an [`FdmSchemeDesc`].
///
/// Optional damping steps with implicit Euler come first; they smooth the
/// payoff kink that would otherwise make the second-order schemes
/// oscillate. The damping steps take their share of the time span
/// proportionally to their count.
///
/// Corresponds to `QuantLib::FdmBackwardSolver`.
#[derive(Debug)]
pub struct FdmBackwardSolver {
    map: Box<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    condition: Arc<FdmStepConditionComposite>,
    scheme_desc: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// Solver over `map`, stepping with the scheme described by `scheme_desc`.
    pub fn new(
        map: Box<dyn FdmLinearOpComposite>,
        bc_set: FdmBoundaryConditionSet,
        condition: Option<Arc<FdmStepConditionComposite>>,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            map,
            bc_set,
            condition: condition.unwrap_or_default(),
            scheme_desc,
        }
    }

    /// Scheme in use.
    pub fn scheme_desc(&self) -> &FdmSchemeDesc {
        &self.scheme_desc
    }

    /// Roll `a` back from `from` to `to` with `steps` regular steps after
    /// `damping_steps` implicit Euler steps.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        damping_steps: Size,
    ) -> Result<()> {
        let all_steps = steps + damping_steps;
        let damping_to = from - (from - to) * damping_steps as Real / all_steps as Real;
        let desc = self.scheme_desc;
        debug!(
            scheme = ?desc.kind,
            from,
            to,
            steps,
            damping_steps,
            "rolling back"
        );

        let condition = Arc::clone(&self.condition);
        let stopping_times = condition.stopping_times().to_vec();
        let condition: &dyn StepCondition = condition.as_ref();
        let map = &mut *self.map;
        let bc_set = &mut self.bc_set;

        if damping_steps > 0 && desc.kind != FdmSchemeKind::ImplicitEuler {
            let damping = ImplicitEulerScheme::new(&mut *map, &mut *bc_set);
            roll(damping, &stopping_times, a, from, damping_to, damping_steps, condition)?;
        }

        match desc.kind {
            FdmSchemeKind::Hundsdorfer => {
                let scheme = HundsdorferScheme::new(desc.theta, desc.mu, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::Douglas => {
                let scheme = DouglasScheme::new(desc.theta, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::CraigSneyd => {
                let scheme = CraigSneydScheme::new(desc.theta, desc.mu, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::ModifiedCraigSneyd => {
                let scheme = ModifiedCraigSneydScheme::new(desc.theta, desc.mu, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::ImplicitEuler => {
                let scheme = ImplicitEulerScheme::new(map, bc_set);
                roll(scheme, &stopping_times, a, from, to, all_steps, condition)
            }
            FdmSchemeKind::ExplicitEuler => {
                let scheme = ExplicitEulerScheme::new(map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::MethodOfLines => {
                let scheme = MethodOfLinesScheme::new(desc.theta, desc.mu, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::TrBDF2 => {
                let scheme = TrBDF2Scheme::new(desc.theta, desc.mu, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
            FdmSchemeKind::CrankNicolson => {
                let scheme = CrankNicolsonScheme::new(desc.theta, map, bc_set);
                roll(scheme, &stopping_times, a, damping_to, to, steps, condition)
            }
        }
    }
}

fn roll<S: FdmScheme>(
    scheme: S,
    stopping_times: &[Time],
    a: &mut Array,
    from: Time,
    to: Time,
    steps: Size,
    condition: &dyn StepCondition,
) -> Result<()> {
    FiniteDifferenceModel::new(scheme, stopping_times.to_vec()).rollback(
        a,
        from,
        to,
        steps,
        Some(condition),
    )
}
