use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Explicit Euler, `a ← a + Δt·L a`. Only conditionally stable.
#[derive(Debug)]
pub struct ExplicitEulerScheme<'a> {
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> ExplicitEulerScheme<'a> {
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
        self.ops.explicit_step(a, t, dt, theta)
    }
}

impl FdmScheme for ExplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        self.step_with(a, t, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn prices_a_european_call_on_a_coarse_grid() {
        let (mesher, mut op, mut bc_set, mut a) = black_scholes_call(101);
        let mut scheme = ExplicitEulerScheme::new(&mut op, &mut bc_set);
        roll(&mut scheme, &mut a, 100);
        assert_abs_diff_eq!(value_at_spot(&mesher, &a), bs_call_reference(), epsilon = 5e-2);
    }
}
