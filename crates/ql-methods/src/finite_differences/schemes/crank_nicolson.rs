use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// θ-scheme: an explicit step with weight `1 − θ` followed by an implicit
/// step with weight `θ`.
#[derive(Debug)]
pub struct CrankNicolsonScheme<'a> {
    theta: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> CrankNicolsonScheme<'a> {
    /// Creates a new instance.
    pub fn new(
        theta: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            dt: None,
            ops: SchemeOperators::new(map, bc_set),
        }
    }
}

impl FdmScheme for CrankNicolsonScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        if self.theta != 1.0 {
            self.ops.explicit_step(a, t, dt, 1.0 - self.theta)?;
        }
        if self.theta != 0.0 {
            self.ops.implicit_step(a, t, dt, self.theta)?;
        }
        Ok(())
    }
}
