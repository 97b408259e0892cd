//! Finite-difference engines.
//!
//! Every engine follows the same recipe: build a mesher around the
//! instrument, pick the payoff calculator, collect step and boundary
//! conditions, hand them to a model solver and read value and greeks at
//! today's state.

mod black_scholes_barrier;
mod black_scholes_vanilla;
mod heston_barrier;
mod heston_vanilla;
mod simple_bs_swing;

pub use black_scholes_barrier::FdBlackScholesBarrierEngine;
pub use black_scholes_vanilla::FdBlackScholesVanillaEngine;
pub use heston_barrier::FdHestonBarrierEngine;
pub use heston_vanilla::FdHestonVanillaEngine;
pub use simple_bs_swing::FdSimpleBSSwingEngine;

use ql_core::{ensure, errors::Result, Real, Size};
use ql_instruments::{BarrierType, PricingResults, StrikedPayoff};
use ql_methods::finite_differences::boundary_conditions::{
    FdmBoundaryConditionSet, FdmDirichletBoundary, Side,
};
use ql_methods::finite_differences::meshers::FdmMesher;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use std::sync::Arc;

/// Grid sizes shared by the finite-difference engines.
///
/// `v_grid` is only read by the Heston engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FdGridSettings {
    /// Time steps.
    pub t_grid: Size,
    /// Points in log-spot.
    pub x_grid: Size,
    /// Points in variance.
    pub v_grid: Size,
    /// Implicit Euler steps taken before the main scheme.
    pub damping_steps: Size,
}

impl Default for FdGridSettings {
    fn default() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            v_grid: 50,
            damping_steps: 0,
        }
    }
}

impl FdGridSettings {
    /// Set the number of time steps.
    pub fn with_t_grid(mut self, t_grid: Size) -> Self {
        self.t_grid = t_grid;
        self
    }

    /// Set the number of log-spot points.
    pub fn with_x_grid(mut self, x_grid: Size) -> Self {
        self.x_grid = x_grid;
        self
    }

    /// Set the number of variance points.
    pub fn with_v_grid(mut self, v_grid: Size) -> Self {
        self.v_grid = v_grid;
        self
    }

    /// Set the number of damping steps.
    pub fn with_damping_steps(mut self, damping_steps: Size) -> Self {
        self.damping_steps = damping_steps;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.t_grid > 0, "at least one time step is required");
        ensure!(self.x_grid >= 3, "at least three spot points are required");
        Ok(())
    }
}

/// Exercise value of `payoff` on the log-spot coordinate of `mesher`.
fn log_inner_value(
    payoff: &Arc<dyn StrikedPayoff>,
    mesher: &Arc<dyn FdmMesher>,
) -> Arc<dyn FdmInnerValueCalculator> {
    Arc::new(FdmLogInnerValue::new(payoff.clone(), mesher.clone(), 0))
}

/// Log-spot bounds of a knock-out grid: the barrier is one of the edges.
fn barrier_bounds(barrier_type: BarrierType, barrier: Real) -> (Option<Real>, Option<Real>) {
    match barrier_type {
        BarrierType::DownIn | BarrierType::DownOut => (Some(barrier.ln()), None),
        BarrierType::UpIn | BarrierType::UpOut => (None, Some(barrier.ln())),
    }
}

/// Rebate paid on the barrier edge of the log-spot direction.
fn rebate_boundary(
    mesher: &dyn FdmMesher,
    barrier_type: BarrierType,
    rebate: Real,
) -> FdmBoundaryConditionSet {
    let side = match barrier_type {
        BarrierType::DownIn | BarrierType::DownOut => Side::Lower,
        BarrierType::UpIn | BarrierType::UpOut => Side::Upper,
    };
    FdmBoundaryConditionSet::new().with(FdmDirichletBoundary::new(mesher, rebate, 0, side))
}

/// `vanilla − knock_out + rebate`, greek by greek.
fn in_out_parity(
    vanilla: &PricingResults,
    knock_out: &PricingResults,
    rebate: Option<&PricingResults>,
) -> PricingResults {
    let combine = |v: Option<Real>, o: Option<Real>, r: Option<Option<Real>>| match (v, o, r) {
        (Some(v), Some(o), None) => Some(v - o),
        (Some(v), Some(o), Some(Some(r))) => Some(v - o + r),
        _ => None,
    };
    let rebate_greek = |f: fn(&PricingResults) -> Option<Real>| rebate.map(f);
    PricingResults {
        npv: vanilla.npv - knock_out.npv + rebate.map_or(0.0, |r| r.npv),
        delta: combine(vanilla.delta, knock_out.delta, rebate_greek(|p| p.delta)),
        gamma: combine(vanilla.gamma, knock_out.gamma, rebate_greek(|p| p.gamma)),
        theta: combine(vanilla.theta, knock_out.theta, rebate_greek(|p| p.theta)),
        additional_results: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    #[test]
    fn grid_settings_round_trip_through_json() {
        let grid = FdGridSettings::default().with_t_grid(50).with_damping_steps(2);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<FdGridSettings>(&json).unwrap(), grid);
        let partial: FdGridSettings = serde_json::from_str(r#"{"x_grid": 400}"#).unwrap();
        assert_eq!(partial.x_grid, 400);
        assert_eq!(partial.t_grid, 100);
    }

    #[test]
    fn parity_combines_missing_greeks_to_none() {
        let vanilla = PricingResults::from_npv(10.0).with_delta(0.6).with_gamma(0.02);
        let out = PricingResults::from_npv(7.0).with_delta(0.5);
        let rebate = PricingResults::from_npv(0.5).with_delta(-0.01);
        let p = in_out_parity(&vanilla, &out, Some(&rebate));
        assert!((p.npv - 3.5).abs() < 1e-14);
        assert!((p.delta.unwrap() - 0.09).abs() < 1e-14);
        assert_eq!(p.gamma, None);
        assert!(in_out_parity(&vanilla, &out, None).delta.is_some());
    }

    #[test]
    fn knock_out_grids_end_at_the_barrier() {
        assert_eq!(barrier_bounds(BarrierType::DownOut, 1.0), (Some(0.0), None));
        assert_eq!(barrier_bounds(BarrierType::UpIn, 1.0), (None, Some(0.0)));
        assert!(FdGridSettings::default().with_x_grid(2).validate().is_err());
    }
}
