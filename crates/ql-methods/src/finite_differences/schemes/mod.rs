//! Time-stepping schemes.
//!
//! Every scheme advances the values one step backwards in time, from `t`
//! to `t − Δt`, for the semi-discrete system `∂V/∂τ = L V`. The ADI
//! schemes (Douglas, Craig-Sneyd, Modified Craig-Sneyd, Hundsdorfer) treat
//! the directional parts of `L` implicitly one at a time and the mixed
//! part explicitly. [`FdmSchemeDesc`] selects a scheme and its parameters.

// ── Modules ───────────────────────────────────────────────────────────────────

mod crank_nicolson;
mod craig_sneyd;
mod douglas;
mod explicit_euler;
mod hundsdorfer;
mod implicit_euler;
mod method_of_lines;
mod modified_craig_sneyd;
mod tr_bdf2;

pub use crank_nicolson::CrankNicolsonScheme;
pub use craig_sneyd::CraigSneydScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::ImplicitEulerScheme;
pub use method_of_lines::MethodOfLinesScheme;
pub use modified_craig_sneyd::ModifiedCraigSneydScheme;
pub use tr_bdf2::TrBDF2Scheme;

use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::matrix_utilities::BiCGStab;
use ql_math::Array;
use tracing::trace;

// ── Scheme interface ──────────────────────────────────────────────────────────

/// One backward time step.
pub trait FdmScheme {
    /// Set the step size used by [`step`](Self::step).
    fn set_step(&mut self, dt: Time);

    /// Replace `a`, the values at `t`, with the values at `t − Δt`.
    fn step(&mut self, a: &mut Array, t: Time) -> Result<()>;
}

// ── Scheme descriptors ────────────────────────────────────────────────────────

/// Available schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeKind {
    /// Hundsdorfer-Verwer ADI.
    Hundsdorfer,
    /// Douglas ADI.
    Douglas,
    /// Craig-Sneyd ADI.
    CraigSneyd,
    /// Modified Craig-Sneyd ADI.
    ModifiedCraigSneyd,
    /// Implicit Euler.
    ImplicitEuler,
    /// Explicit Euler.
    ExplicitEuler,
    /// Runge-Kutta integration of the semi-discrete system.
    MethodOfLines,
    /// Trapezoidal stage followed by a BDF2 stage.
    TrBDF2,
    /// Crank-Nicolson.
    CrankNicolson,
}

/// A scheme with its two parameters.
///
/// `theta` is the implicitness of the ADI and θ-schemes, the tolerance
/// for the method of lines, or `α` for TR-BDF2. `mu` is the weight of
/// the correction stage, the relative initial step for the method of
/// lines, or the iterative-solver tolerance for TR-BDF2.
///
/// Corresponds to `QuantLib::FdmSchemeDesc`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// Scheme family.
    pub kind: FdmSchemeKind,
    /// Implicitness; the error tolerance for method of lines.
    pub theta: Real,
    /// Second scheme parameter; the initial relative step for method of lines.
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Creates a new instance.
    pub fn new(kind: FdmSchemeKind, theta: Real, mu: Real) -> Self {
        Self { kind, theta, mu }
    }

    /// θ = 0.5.
    pub fn douglas() -> Self {
        Self::new(FdmSchemeKind::Douglas, 0.5, 0.0)
    }

    /// Fully implicit Euler.
    pub fn implicit_euler() -> Self {
        Self::new(FdmSchemeKind::ImplicitEuler, 0.0, 0.0)
    }

    /// Explicit Euler.
    pub fn explicit_euler() -> Self {
        Self::new(FdmSchemeKind::ExplicitEuler, 0.0, 0.0)
    }

    /// θ = μ = 0.5.
    pub fn craig_sneyd() -> Self {
        Self::new(FdmSchemeKind::CraigSneyd, 0.5, 0.5)
    }

    /// θ = 1/3, μ = 1/3.
    pub fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeKind::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// θ = 1/2 + √3/6, μ = 1/2.
    pub fn hundsdorfer() -> Self {
        Self::new(FdmSchemeKind::Hundsdorfer, 0.5 + 3.0_f64.sqrt() / 6.0, 0.5)
    }

    /// θ = 1 − √2/2, μ = 1/2.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(FdmSchemeKind::Hundsdorfer, 1.0 - 0.5_f64.sqrt(), 0.5)
    }

    /// Method of lines with per-step tolerance `eps` and first trial step
    /// `rel_init_step_size·Δt`.
    pub fn method_of_lines(eps: Real, rel_init_step_size: Real) -> Self {
        Self::new(FdmSchemeKind::MethodOfLines, eps, rel_init_step_size)
    }

    /// α = 2 − √2 with an iterative tolerance of 1e-8.
    pub fn tr_bdf2() -> Self {
        Self::new(FdmSchemeKind::TrBDF2, 2.0 - 2.0_f64.sqrt(), 1e-8)
    }

    /// Crank-Nicolson with θ = 0.5.
    pub fn crank_nicolson() -> Self {
        Self::new(FdmSchemeKind::CrankNicolson, 0.5, 0.0)
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

/// Relative tolerance of the iterative solve in implicit steps.
pub(crate) const IMPLICIT_REL_TOL: Real = 1e-8;

// ── Shared stages ─────────────────────────────────────────────────────────────

/// The operator and boundary conditions a scheme steps with, plus the
/// stages the schemes have in common.
#[derive(Debug)]
pub(crate) struct SchemeOperators<'a> {
    pub(crate) map: &'a mut dyn FdmLinearOpComposite,
    pub(crate) bc_set: &'a mut FdmBoundaryConditionSet,
}

impl<'a> SchemeOperators<'a> {
    pub(crate) fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self { map, bc_set }
    }

    /// Freeze the operator on `[t − dt, t]` and the boundaries at `t − dt`.
    pub(crate) fn set_time(&mut self, t: Time, dt: Time) -> Result<()> {
        ensure!(t - dt > -1e-8, "a step towards negative time given");
        let t0 = (t - dt).max(0.0);
        self.map.set_time(t0, t)?;
        self.bc_set.set_time(t0);
        Ok(())
    }

    /// `a + factor·L a` with boundary conditions applied.
    pub(crate) fn explicit(&self, a: &Array, factor: Real) -> Array {
        self.bc_set.apply_before_applying(&*self.map);
        let mut y = a + &(self.map.apply(a) * factor);
        self.bc_set.apply_after_applying(&mut y);
        y
    }

    /// The Douglas stage: explicit predictor followed by one implicit
    /// correction per direction. Returns the predictor and the result.
    pub(crate) fn douglas_stage(
        &self,
        a: &Array,
        dt: Time,
        theta: Real,
    ) -> Result<(Array, Array)> {
        let y0 = self.explicit(a, dt);
        let y = self.directional_corrections(y0.clone(), a, dt, theta)?;
        Ok((y0, y))
    }

    /// `y ← (I − θΔt L_i)⁻¹ (y − θΔt L_i base)` for every direction `i`.
    pub(crate) fn directional_corrections(
        &self,
        mut y: Array,
        base: &Array,
        dt: Time,
        theta: Real,
    ) -> Result<Array> {
        for i in 0..self.map.size() {
            let rhs = &y - &(self.map.apply_direction(i, base) * (theta * dt));
            y = self.map.solve_splitting(i, &rhs, -theta * dt)?;
        }
        Ok(y)
    }

    /// Solve `(I − β L) x = rhs`; direct in one direction, BiCGStab with
    /// the direction-0 splitting as preconditioner otherwise.
    pub(crate) fn solve_implicit(&self, rhs: &Array, beta: Real, rel_tol: Real) -> Result<Array> {
        if self.map.size() == 1 {
            return self.map.solve_splitting(0, rhs, -beta);
        }
        let map = &*self.map;
        let apply_f = |r: &Array| -> Result<Array> { Ok(r - &(map.apply(r) * beta)) };
        let preconditioner = |r: &Array| map.preconditioner(r, -beta);
        let result = BiCGStab::new(&apply_f, rhs.len().max(10), rel_tol)
            .with_preconditioner(&preconditioner)
            .solve(rhs, Some(rhs))?;
        trace!(
            iterations = result.iterations,
            error = result.error,
            "implicit step solved"
        );
        Ok(result.x)
    }

    /// Implicit Euler with weight `theta` on `[t − dt, t]`.
    pub(crate) fn implicit_step(&mut self, a: &mut Array, t: Time, dt: Time, theta: Real) -> Result<()> {
        self.set_time(t, dt)?;
        self.bc_set.apply_before_solving(&*self.map, a);
        *a = self.solve_implicit(a, theta * dt, IMPLICIT_REL_TOL)?;
        self.bc_set.apply_after_solving(a);
        Ok(())
    }

    /// Explicit Euler with weight `theta` on `[t − dt, t]`.
    pub(crate) fn explicit_step(&mut self, a: &mut Array, t: Time, dt: Time, theta: Real) -> Result<()> {
        self.set_time(t, dt)?;
        *a = self.explicit(a, theta * dt);
        Ok(())
    }

    /// Craig-Sneyd step on `[t − dt, t]`.
    pub(crate) fn craig_sneyd_step(
        &mut self,
        a: &mut Array,
        t: Time,
        dt: Time,
        theta: Real,
        mu: Real,
    ) -> Result<()> {
        self.set_time(t, dt)?;
        let (y0, y) = self.douglas_stage(a, dt, theta)?;

        self.bc_set.apply_before_applying(&*self.map);
        let mut yt = &y0 + &(self.map.apply_mixed(&(&y - &*a)) * (mu * dt));
        self.bc_set.apply_after_applying(&mut yt);

        let mut yt = self.directional_corrections(yt, a, dt, theta)?;
        self.bc_set.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}

/// `Δt` or an error if [`FdmScheme::set_step`] was never called.
pub(crate) fn step_size(dt: Option<Time>) -> Result<Time> {
    match dt {
        Some(dt) => Ok(dt),
        None => ql_core::fail!("time step not set"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::finite_differences::boundary_conditions::{
        FdmBoundaryConditionSet, FdmDirichletBoundary, Side,
    };
    use crate::finite_differences::meshers::{
        FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite, Uniform1dMesher,
    };
    use crate::finite_differences::operators::{FdmBlackScholesOp, FdmHestonOp};
    use ql_math::Array;
    use ql_processes::{black_scholes_merton_process, HestonProcess};
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    pub(crate) const SPOT: f64 = 100.0;
    pub(crate) const STRIKE: f64 = 100.0;
    pub(crate) const RATE: f64 = 0.05;
    pub(crate) const VOL: f64 = 0.2;
    pub(crate) const MATURITY: f64 = 1.0;

    /// Black-Scholes problem on a uniform log-spot grid with a European
    /// call as initial condition and Dirichlet boundaries.
    pub(crate) fn black_scholes_call(
        size: usize,
    ) -> (FdmMesherComposite, FdmBlackScholesOp, FdmBoundaryConditionSet, Array) {
        let mesher = FdmMesherComposite::from_1d(
            Uniform1dMesher::new((SPOT / 8.0).ln(), (SPOT * 8.0).ln(), size).unwrap(),
        )
        .unwrap();
        let process = black_scholes_merton_process(
            SPOT,
            Arc::new(FlatForward::new(RATE)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(BlackConstantVol::new(VOL)),
        );
        let op = FdmBlackScholesOp::new(&mesher, &process, STRIKE, false, None, 0);
        let x = mesher.locations(0);
        let a = x.map(|x| (x.exp() - STRIKE).max(0.0));
        let bc_set = FdmBoundaryConditionSet::new()
            .with(FdmDirichletBoundary::new(&mesher, 0.0, 0, Side::Lower));
        (mesher, op, bc_set, a)
    }

    /// Interpolated value at the spot.
    pub(crate) fn value_at_spot(mesher: &FdmMesherComposite, a: &Array) -> f64 {
        use ql_math::interpolations::{CubicNaturalSpline, Interpolation1D};
        let x = mesher.locations(0);
        CubicNaturalSpline::new(x.as_slice(), a.as_slice())
            .unwrap()
            .value(SPOT.ln())
    }

    /// Heston operator on a small grid with a call payoff.
    pub(crate) fn heston_call() -> (Arc<FdmMesherComposite>, FdmHestonOp, Array) {
        let process = HestonProcess::new(
            Arc::new(FlatForward::new(RATE)),
            Arc::new(FlatForward::new(0.0)),
            SPOT,
            0.04,
            1.5,
            0.04,
            0.3,
            -0.5,
        )
        .unwrap();
        let v_mesher = FdmHestonVarianceMesher::new(11, &process, MATURITY, 10, 1e-4).unwrap();
        let x_mesher = Uniform1dMesher::new((SPOT / 5.0).ln(), (SPOT * 5.0).ln(), 41).unwrap();
        let mesher = Arc::new(FdmMesherComposite::from_2d(x_mesher, v_mesher).unwrap());
        let op = FdmHestonOp::new(mesher.as_ref(), &process);
        let a = Array::from_fn(mesher.layout().size(), |i| {
            let it = mesher.layout().iter().nth(i).unwrap();
            (mesher.location(&it, 0).exp() - STRIKE).max(0.0)
        });
        (mesher, op, a)
    }

    /// Step `a` from maturity back to today.
    pub(crate) fn roll(scheme: &mut dyn super::FdmScheme, a: &mut Array, steps: usize) {
        let dt = MATURITY / steps as f64;
        scheme.set_step(dt);
        for i in 0..steps {
            scheme.step(a, MATURITY - i as f64 * dt).unwrap();
        }
    }

    /// Black-Scholes call for the test parameters.
    pub(crate) fn bs_call_reference() -> f64 {
        use ql_math::normal_cdf;
        let sd = VOL * MATURITY.sqrt();
        let d1 = ((SPOT / STRIKE).ln() + (RATE + 0.5 * VOL * VOL) * MATURITY) / sd;
        let d2 = d1 - sd;
        SPOT * normal_cdf(d1) - STRIKE * (-RATE * MATURITY).exp() * normal_cdf(d2)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{heston_call, roll, STRIKE};
    use super::*;
    use crate::finite_differences::meshers::FdmMesher;

    #[test]
    fn presets() {
        let h = FdmSchemeDesc::hundsdorfer();
        assert_eq!(h.kind, FdmSchemeKind::Hundsdorfer);
        assert!((h.theta - 0.788_675_134_594_812_9).abs() < 1e-15);
        let mh = FdmSchemeDesc::modified_hundsdorfer();
        assert_eq!(mh.kind, FdmSchemeKind::Hundsdorfer);
        assert!((mh.theta - 0.292_893_218_813_452_5).abs() < 1e-15);
        assert_eq!(FdmSchemeDesc::default(), FdmSchemeDesc::douglas());
        let mol = FdmSchemeDesc::method_of_lines(0.001, 0.01);
        assert_eq!((mol.theta, mol.mu), (0.001, 0.01));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn scheme_desc_from_json() {
        let desc: FdmSchemeDesc =
            serde_json::from_str(r#"{"kind":"CraigSneyd","theta":0.5,"mu":0.5}"#).unwrap();
        assert_eq!(desc, FdmSchemeDesc::craig_sneyd());
    }

    #[test]
    fn unset_step_is_an_error() {
        let (_, mut op, mut bc_set, mut a) = test_support::black_scholes_call(11);
        let mut scheme = DouglasScheme::new(0.5, &mut op, &mut bc_set);
        assert!(scheme.step(&mut a, 1.0).is_err());
    }

    #[test]
    fn adi_schemes_agree_on_heston() {
        let (mesher, op, initial) = heston_call();
        let layout = mesher.layout();
        let v = mesher.locations(1);
        let spot_index = layout
            .iter()
            .filter(|it| it.coordinates()[0] == 20)
            .min_by(|a, b| {
                (v[a.index()] - 0.04)
                    .abs()
                    .total_cmp(&(v[b.index()] - 0.04).abs())
            })
            .map(|it| it.index())
            .unwrap();

        let descs = [
            FdmSchemeDesc::douglas(),
            FdmSchemeDesc::craig_sneyd(),
            FdmSchemeDesc::modified_craig_sneyd(),
            FdmSchemeDesc::hundsdorfer(),
            FdmSchemeDesc::modified_hundsdorfer(),
        ];
        let mut values = Vec::new();
        for desc in descs {
            let mut op = op.clone();
            let mut bc_set = FdmBoundaryConditionSet::new();
            let mut a = initial.clone();
            let mut scheme: Box<dyn FdmScheme + '_> = match desc.kind {
                FdmSchemeKind::Douglas => Box::new(DouglasScheme::new(desc.theta, &mut op, &mut bc_set)),
                FdmSchemeKind::CraigSneyd => {
                    Box::new(CraigSneydScheme::new(desc.theta, desc.mu, &mut op, &mut bc_set))
                }
                FdmSchemeKind::ModifiedCraigSneyd => Box::new(ModifiedCraigSneydScheme::new(
                    desc.theta,
                    desc.mu,
                    &mut op,
                    &mut bc_set,
                )),
                _ => Box::new(HundsdorferScheme::new(desc.theta, desc.mu, &mut op, &mut bc_set)),
            };
            roll(scheme.as_mut(), &mut a, 50);
            values.push(a[spot_index]);
        }
        for v in &values {
            assert!(*v > 0.8 * 10.45 && *v < 1.1 * 10.45, "value {v}");
            assert!((v - values[0]).abs() < 0.05, "{values:?}");
        }
        assert!(values[0] < STRIKE);
    }
}
