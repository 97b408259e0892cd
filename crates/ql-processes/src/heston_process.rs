//! Heston stochastic volatility process.
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```

use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::distributions::NonCentralChiSquared;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// The Heston stochastic volatility process.
#[derive(Debug, Clone)]
pub struct HestonProcess {
    s0: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
}

impl HestonProcess {
    /// Heston process with spot `s0`, initial variance `v0`, mean reversion
    /// `kappa` towards `theta`, vol-of-vol `sigma` and spot/variance
    /// correlation `rho`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        s0: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa > 0.0, "mean reversion speed must be positive, got {kappa}");
        ensure!(theta >= 0.0, "long-run variance must be non-negative, got {theta}");
        ensure!(sigma >= 0.0, "vol-of-vol must be non-negative, got {sigma}");
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation must be in [-1, 1], got {rho}"
        );
        Ok(Self {
            s0,
            v0,
            kappa,
            theta,
            sigma,
            rho,
            risk_free_rate,
            dividend_yield,
        })
    }

    /// Spot price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Risk-free rate.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// Whether `2κθ ≥ σ²`, i.e. the variance stays away from zero.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    /// `E[v(t)] = θ + (v₀ − θ) e^{−κt}`.
    pub fn expected_variance(&self, t: Time) -> Real {
        self.theta + (self.v0 - self.theta) * (-self.kappa * t).exp()
    }

    /// `(1/t) ∫₀ᵗ E[v(u)] du`, the expected variance averaged up to `t`.
    pub fn average_expected_variance(&self, t: Time) -> Real {
        let kt = self.kappa * t;
        if kt > 1e-8 {
            self.theta + (self.v0 - self.theta) * (1.0 - (-kt).exp()) / kt
        } else {
            self.v0
        }
    }

    /// Law of `v(t)` given `v(0) = v₀`: `v(t) = c·X` with
    /// `X ~ χ'²(4κθ/σ², ncp)`. Returns `(c, law of X)`.
    pub fn variance_distribution(&self, t: Time) -> Result<(Real, NonCentralChiSquared)> {
        ensure!(t > 0.0, "horizon must be positive, got {t}");
        ensure!(self.sigma > 0.0, "variance is deterministic without vol-of-vol");
        let sigma2 = self.sigma * self.sigma;
        let decay = (-self.kappa * t).exp();
        let scale = sigma2 * (1.0 - decay) / (4.0 * self.kappa);
        let df = 4.0 * self.kappa * self.theta / sigma2;
        let ncp = self.v0 * decay / scale;
        Ok((scale, NonCentralChiSquared::new(df, ncp)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use ql_termstructures::FlatForward;

    fn heston(v0: Real, sigma: Real) -> HestonProcess {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            100.0,
            v0,
            1.5,
            0.04,
            sigma,
            -0.7,
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_parameters() {
        let r: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
        let mk = |v0, rho, sigma| {
            HestonProcess::new(r.clone(), r.clone(), 100.0, v0, 1.0, 0.04, sigma, rho)
        };
        assert!(mk(-0.1, 0.0, 0.3).is_err());
        assert!(mk(0.04, 1.5, 0.3).is_err());
        assert!(mk(0.04, 0.0, -0.3).is_err());
        assert!(mk(0.04, -1.0, 0.3).is_ok());
    }

    #[test]
    fn feller_condition() {
        assert!(heston(0.04, 0.3).feller_condition());
        assert!(!heston(0.04, 0.66).feller_condition());
    }

    #[test]
    fn variance_law_has_the_cir_mean() {
        let p = heston(0.09, 0.3);
        let (scale, law) = p.variance_distribution(0.5).unwrap();
        let mean = scale * law.mean();
        assert_abs_diff_eq!(mean, p.expected_variance(0.5), epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn average_variance_lies_between_v0_and_theta(v0 in 0.0f64..0.3, t in 0.01f64..10.0) {
            let p = heston(v0, 0.3);
            let avg = p.average_expected_variance(t);
            prop_assert!(avg >= v0.min(0.04) - 1e-12);
            prop_assert!(avg <= v0.max(0.04) + 1e-12);
        }
    }
}
