//! `LocalVolSurface` — Dupire local volatility surface.
//!
//! Computes local volatilities from an implied (Black) volatility surface
//! with Dupire's formula in terms of total variance.

use crate::black_vol_term_structure::BlackVolTermStructure;
use crate::local_vol_term_structure::LocalVolTermStructure;
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{ensure_post, errors::Result, Real, Time, Volatility};
use std::sync::Arc;

/// A local volatility surface derived from a Black volatility surface.
///
/// With `w = σ²·T` the total implied variance and `y = ln(K/F)` the
/// log-moneyness, the local variance is:
///
/// $$\sigma^2_\text{loc}(T, K) = \frac{\frac{\partial w}{\partial T}}
///     {1 - \frac{y}{w}\frac{\partial w}{\partial y}
///       + \frac14\left(-\frac14 - \frac{1}{w} + \frac{y^2}{w^2}\right)
///              \left(\frac{\partial w}{\partial y}\right)^2
///       + \frac12 \frac{\partial^2 w}{\partial y^2}}$$
///
/// The time derivative is taken at constant forward moneyness.
#[derive(Debug, Clone)]
pub struct LocalVolSurface {
    black_vol: Arc<dyn BlackVolTermStructure>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    underlying: Real,
}

impl LocalVolSurface {
    /// Local vol implied by `black_vol` for a spot at `underlying`.
    pub fn new(
        black_vol: Arc<dyn BlackVolTermStructure>,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        underlying: Real,
    ) -> Self {
        Self {
            black_vol,
            risk_free_rate,
            dividend_yield,
            underlying,
        }
    }

    fn forward(&self, t: Time) -> Real {
        self.underlying * self.dividend_yield.discount(t) / self.risk_free_rate.discount(t)
    }
}

impl TermStructure for LocalVolSurface {
    fn max_time(&self) -> Time {
        self.black_vol.max_time()
    }

    fn allows_extrapolation(&self) -> bool {
        self.black_vol.allows_extrapolation()
    }
}

impl LocalVolTermStructure for LocalVolSurface {
    fn local_vol_impl(&self, t: Time, strike: Real) -> Result<Volatility> {
        let variance = |tt: Time, k: Real| self.black_vol.black_variance(tt, k);
        let dr = self.risk_free_rate.discount(t);
        let dq = self.dividend_yield.discount(t);

        let y = (strike / self.forward(t)).ln();
        let dy = if y.abs() > 0.001 { y * 0.0001 } else { 0.000001 };
        let strike_p = strike * dy.exp();
        let strike_m = strike / dy.exp();
        let w = variance(t, strike);
        let wp = variance(t, strike_p);
        let wm = variance(t, strike_m);
        let dwdy = (wp - wm) / (2.0 * dy);
        let d2wdy2 = (wp - 2.0 * w + wm) / (dy * dy);

        let dwdt = if t == 0.0 {
            let dt = 0.0001;
            let drpt = self.risk_free_rate.discount(t + dt);
            let dqpt = self.dividend_yield.discount(t + dt);
            let strike_pt = strike * dr * dqpt / (drpt * dq);
            (variance(t + dt, strike_pt) - w) / dt
        } else {
            let dt = (t / 2.0).min(0.0001);
            let drpt = self.risk_free_rate.discount(t + dt);
            let drmt = self.risk_free_rate.discount(t - dt);
            let dqpt = self.dividend_yield.discount(t + dt);
            let dqmt = self.dividend_yield.discount(t - dt);
            let strike_pt = strike * dr * dqpt / (drpt * dq);
            let strike_mt = strike * dr * dqmt / (drmt * dq);
            (variance(t + dt, strike_pt) - variance(t - dt, strike_mt)) / (2.0 * dt)
        };

        let local_variance = if dwdy == 0.0 && d2wdy2 == 0.0 {
            dwdt
        } else {
            let den1 = 1.0 - y / w * dwdy;
            let den2 = 0.25 * (-0.25 - 1.0 / w + y * y / (w * w)) * dwdy * dwdy;
            let den3 = 0.5 * d2wdy2;
            dwdt / (den1 + den2 + den3)
        };
        ensure_post!(
            local_variance >= 0.0,
            "negative local vol^2 at strike {strike} and time {t}; the black vol surface is not smooth enough"
        );
        Ok(local_variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_variance_surface::BlackVarianceSurface;
    use crate::black_vol_term_structure::BlackConstantVol;
    use crate::flat_forward::FlatForward;
    use approx::assert_abs_diff_eq;

    fn curves() -> (Arc<dyn YieldTermStructure>, Arc<dyn YieldTermStructure>) {
        (Arc::new(FlatForward::new(0.05)), Arc::new(FlatForward::new(0.02)))
    }

    #[test]
    fn constant_black_vol_gives_constant_local_vol() {
        let (rf, dy) = curves();
        let surface = LocalVolSurface::new(Arc::new(BlackConstantVol::new(0.20)), rf, dy, 100.0);
        for (t, k) in [(1.0, 100.0), (2.0, 80.0), (0.5, 120.0), (0.0, 100.0)] {
            assert_abs_diff_eq!(surface.local_vol(t, k).unwrap(), 0.20, epsilon = 1e-6);
        }
    }

    #[test]
    fn term_structure_of_atm_vol_is_recovered() {
        // σ(0.5) = 0.2, σ(1) = 0.3: forward vol² = (0.09 - 0.02) / 0.5 = 0.14
        let black = BlackVarianceSurface::new(
            &[0.5, 1.0],
            &[50.0, 200.0],
            &[vec![0.2, 0.2], vec![0.3, 0.3]],
        )
        .unwrap();
        let (rf, dy) = curves();
        let surface = LocalVolSurface::new(Arc::new(black), rf, dy, 100.0);
        assert_abs_diff_eq!(surface.local_vol(0.75, 100.0).unwrap(), 0.14_f64.sqrt(), epsilon = 1e-6);
    }
}
