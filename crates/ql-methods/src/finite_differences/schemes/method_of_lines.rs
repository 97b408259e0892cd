use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::ode::AdaptiveRungeKutta;
use ql_math::Array;
use std::cell::RefCell;

/// Method of lines: the semi-discrete system `dV/dt = −L V` is integrated
/// over each step by an adaptive Runge-Kutta method.
///
/// Corresponds to `QuantLib::MethodOfLinesScheme`.
#[derive(Debug)]
pub struct MethodOfLinesScheme<'a> {
    eps: Real,
    rel_init_step_size: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> MethodOfLinesScheme<'a> {
    /// `eps` is the per-step tolerance of the integrator, which starts
    /// with a trial step of `rel_init_step_size·Δt`.
    pub fn new(
        eps: Real,
        rel_init_step_size: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            eps,
            rel_init_step_size,
            dt: None,
            ops: SchemeOperators::new(map, bc_set),
        }
    }
}

impl FdmScheme for MethodOfLinesScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        ql_core::ensure!(t - dt > -1e-8, "a step towards negative time given");

        let ops = RefCell::new(&mut self.ops);
        let rhs = |s: Real, r: &Array| -> Result<Array> {
            let mut ops = ops.borrow_mut();
            ops.map.set_time(s, s + 0.0001)?;
            ops.bc_set.set_time(s);
            ops.bc_set.apply_before_applying(&*ops.map);
            let mut dxdt = -ops.map.apply(r);
            ops.bc_set.apply_after_applying(&mut dxdt);
            Ok(dxdt)
        };
        *a = AdaptiveRungeKutta::new(self.eps, self.rel_init_step_size * dt)
            .integrate(&rhs, a, t, (t - dt).max(0.0))?;
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
        let (mesher, mut op, mut bc_set, mut a) = black_scholes_call(101);
        let mut scheme = MethodOfLinesScheme::new(0.001, 0.01, &mut op, &mut bc_set);
        roll(&mut scheme, &mut a, 20);
        assert_abs_diff_eq!(value_at_spot(&mesher, &a), bs_call_reference(), epsilon = 5e-2);
    }
}
