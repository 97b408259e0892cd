use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Hundsdorfer-Verwer ADI scheme.
///
/// After the Douglas stage the full operator is re-applied to the
/// increment with weight `μ`, and the second sweep is anchored on the
/// Douglas result instead of the starting values.
///
/// Corresponds to `QuantLib::HundsdorferScheme`.
#[derive(Debug)]
pub struct HundsdorferScheme<'a> {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> HundsdorferScheme<'a> {
    /// Creates a new instance.
    pub fn new(
        theta: Real,
        mu: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            mu,
            dt: None,
            ops: SchemeOperators::new(map, bc_set),
        }
    }
}

impl FdmScheme for HundsdorferScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        let ops = &mut self.ops;
        ops.set_time(t, dt)?;
        let (y0, y) = ops.douglas_stage(a, dt, self.theta)?;

        ops.bc_set.apply_before_applying(&*ops.map);
        let mut yt = &y0 + &(ops.map.apply(&(&y - &*a)) * (self.mu * dt));
        ops.bc_set.apply_after_applying(&mut yt);

        let mut yt = ops.directional_corrections(yt, &y, dt, self.theta)?;
        ops.bc_set.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn prices_a_european_call() {
        let (mesher, mut op, mut bc_set, mut a) = black_scholes_call(201);
        let theta = 0.5 + 3.0_f64.sqrt() / 6.0;
        let mut scheme = HundsdorferScheme::new(theta, 0.5, &mut op, &mut bc_set);
        roll(&mut scheme, &mut a, 100);
        assert_abs_diff_eq!(value_at_spot(&mesher, &a), bs_call_reference(), epsilon = 2e-2);
    }
}
