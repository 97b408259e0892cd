use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Douglas ADI scheme.
///
/// An explicit Euler predictor over the full operator, then one implicit
/// correction with weight `θ` per direction. With `θ = ½` it reduces to
/// Crank-Nicolson in one dimension.
///
/// Corresponds to `QuantLib::DouglasScheme`.
#[derive(Debug)]
pub struct DouglasScheme<'a> {
    theta: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> DouglasScheme<'a> {
    /// Douglas scheme with implicitness `theta`.
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

impl FdmScheme for DouglasScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        self.ops.set_time(t, dt)?;
        let (_, mut y) = self.ops.douglas_stage(a, dt, self.theta)?;
        self.ops.bc_set.apply_after_solving(&mut y);
        *a = y;
        Ok(())
    }
}
