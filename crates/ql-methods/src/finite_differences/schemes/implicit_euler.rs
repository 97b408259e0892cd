use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Implicit Euler, `(I − Δt·L) a' = a`.
///
/// One-dimensional operators are inverted directly; otherwise the system
/// is solved with BiCGStab preconditioned by the direction-0 splitting.
/// First order but L-stable, which makes it the damping scheme of choice
/// for the first steps after a non-smooth payoff.
#[derive(Debug)]
pub struct ImplicitEulerScheme<'a> {
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> ImplicitEulerScheme<'a> {
    /// Creates a new instance.
    pub fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            dt: None,
            ops: SchemeOperators::new(map, bc_set),
        }
    }

    /// Step with `theta·Δt` instead of `Δt`.
    pub fn step_with(&mut self, a: &mut Array, t: Time, theta: Real) -> Result<()> {
        let dt = step_size(self.dt)?;
        self.ops.implicit_step(a, t, dt, theta)
    }
}

impl FdmScheme for ImplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        self.step_with(a, t, 1.0)
    }
}
