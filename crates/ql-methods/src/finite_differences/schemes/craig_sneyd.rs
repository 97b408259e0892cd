use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Craig-Sneyd ADI scheme: the Douglas stage followed by a second sweep
/// whose right-hand side corrects the explicit mixed-derivative term with
/// weight `μ`.
///
/// Corresponds to `QuantLib::CraigSneydScheme`.
#[derive(Debug)]
pub struct CraigSneydScheme<'a> {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> CraigSneydScheme<'a> {
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

impl FdmScheme for CraigSneydScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        self.ops.craig_sneyd_step(a, t, dt, self.theta, self.mu)
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
        let mut scheme = CraigSneydScheme::new(0.5, 0.5, &mut op, &mut bc_set);
        roll(&mut scheme, &mut a, 100);
        assert_abs_diff_eq!(value_at_spot(&mesher, &a), bs_call_reference(), epsilon = 2e-2);
    }
}
