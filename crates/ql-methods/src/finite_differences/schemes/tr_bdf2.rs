use super::{step_size, FdmScheme, SchemeOperators};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// TR-BDF2: a trapezoidal stage over `α·Δt`, done with Craig-Sneyd at
/// `θ = μ = ½`, followed by a BDF2 stage over the rest of the step.
///
/// With `α = 2 − √2` the scheme is second order and L-stable.
///
/// Corresponds to `QuantLib::TrBDF2Scheme`.
#[derive(Debug)]
pub struct TrBDF2Scheme<'a> {
    alpha: Real,
    rel_tol: Real,
    dt: Option<Time>,
    ops: SchemeOperators<'a>,
}

impl<'a> TrBDF2Scheme<'a> {
    /// `rel_tol` bounds the residual of the iterative solve used for
    /// multi-dimensional operators.
    pub fn new(
        alpha: Real,
        rel_tol: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            alpha,
            rel_tol,
            dt: None,
            ops: SchemeOperators::new(map, bc_set),
        }
    }
}

impl FdmScheme for TrBDF2Scheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_size(self.dt)?;
        let alpha = self.alpha;

        let mut f_star = a.clone();
        self.ops.craig_sneyd_step(&mut f_star, t, alpha * dt, 0.5, 0.5)?;

        // the operator keeps the time of the trapezoidal stage
        self.ops.bc_set.set_time((t - dt).max(0.0));
        self.ops.bc_set.apply_before_solving(&*self.ops.map, &mut f_star);

        let f = (&f_star * (1.0 / alpha) - &*a * ((1.0 - alpha).powi(2) / alpha)) / (2.0 - alpha);
        let beta = (1.0 - alpha) / (2.0 - alpha) * dt;
        *a = self.ops.solve_implicit(&f, beta, self.rel_tol)?;
        self.ops.bc_set.apply_after_solving(a);
        Ok(())
    }
}
