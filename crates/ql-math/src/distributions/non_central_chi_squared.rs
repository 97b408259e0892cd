//! Non-central chi-squared distribution.
//!
//! The square-root (CIR) variance process has a scaled non-central
//! chi-squared transition law, which is what the Heston variance mesher
//! samples its quantiles from.
//!
//! The CDF is the Poisson mixture
//! `F(x; k, λ) = Σⱼ e^{-λ/2} (λ/2)ʲ / j! · P(χ²_{k+2j} ≤ x)`,
//! summed outwards from the Poisson mode so that neither tail underflows.

use crate::solvers1d::{bracket, brent};
use ql_core::{ensure, errors::Result, Real};
use statrs::function::gamma::{gamma_lr, ln_gamma};

const TERM_TOLERANCE: Real = 1e-16;
const MAX_TERMS: usize = 10_000;

/// Non-central chi-squared law with `df` degrees of freedom and
/// non-centrality `ncp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonCentralChiSquared {
    df: Real,
    ncp: Real,
}

impl NonCentralChiSquared {
    /// Requires `df > 0` and `ncp ≥ 0`.
    pub fn new(df: Real, ncp: Real) -> Result<Self> {
        ensure!(df > 0.0, "degrees of freedom must be positive, got {df}");
        ensure!(ncp >= 0.0, "non-centrality must be non-negative, got {ncp}");
        Ok(Self { df, ncp })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Non-centrality parameter.
    pub fn ncp(&self) -> Real {
        self.ncp
    }

    /// Mean `k + λ`.
    pub fn mean(&self) -> Real {
        self.df + self.ncp
    }

    /// Variance `2(k + 2λ)`.
    pub fn variance(&self) -> Real {
        2.0 * (self.df + 2.0 * self.ncp)
    }

    /// `P(X ≤ x)`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let half_ncp = 0.5 * self.ncp;
        let central = |j: usize| gamma_lr(0.5 * self.df + j as Real, 0.5 * x);
        if half_ncp == 0.0 {
            return central(0);
        }

        let log_weight =
            |j: usize| -half_ncp + j as Real * half_ncp.ln() - ln_gamma(j as Real + 1.0);
        let mode = half_ncp.floor() as usize;

        let mut sum = 0.0;
        // upward from the mode; P(χ²_{k+2j} ≤ x) decreases in j
        for j in mode..mode + MAX_TERMS {
            let term = log_weight(j).exp() * central(j);
            sum += term;
            if term <= TERM_TOLERANCE * sum.max(TERM_TOLERANCE) && j > mode {
                break;
            }
        }
        for j in (0..mode).rev() {
            let w = log_weight(j).exp();
            sum += w * central(j);
            if w <= TERM_TOLERANCE {
                break;
            }
        }
        sum.clamp(0.0, 1.0)
    }

    /// Quantile function, `x` with `P(X ≤ x) = p` for `p ∈ (0, 1)`.
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ensure!(p > 0.0 && p < 1.0, "probability {p} outside (0, 1)");
        let f = |x: Real| self.cdf(x) - p;
        let step = self.variance().sqrt().max(1e-3);
        let (lo, hi) = bracket(f, self.mean(), step, 0.0, Real::MAX.sqrt())?;
        brent(f, lo, hi, 1e-10 * self.mean().max(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    #[test]
    fn zero_non_centrality_is_central_chi_squared() {
        let nc = NonCentralChiSquared::new(3.5, 0.0).unwrap();
        let c = ChiSquared::new(3.5).unwrap();
        for &x in &[0.1, 1.0, 3.5, 8.0] {
            assert_abs_diff_eq!(nc.cdf(x), c.cdf(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn cdf_reference_value() {
        // k = 2, λ = 1: F(x) = 1 - Q₁(√λ, √x)
        let nc = NonCentralChiSquared::new(2.0, 1.0).unwrap();
        assert_abs_diff_eq!(nc.cdf(3.0), 0.620_643_653_2, epsilon = 1e-9);
    }

    #[test]
    fn cdf_is_monotone_and_bounded() {
        let nc = NonCentralChiSquared::new(4.0, 25.0).unwrap();
        let mut last = 0.0;
        for i in 1..200 {
            let v = nc.cdf(i as Real * 0.5);
            assert!(v >= last - 1e-14);
            assert!((0.0..=1.0).contains(&v));
            last = v;
        }
        assert!(last > 0.999);
    }

    #[test]
    fn quantile_inverts_cdf() {
        let nc = NonCentralChiSquared::new(1.6, 38.0).unwrap();
        for &p in &[1e-4, 0.1, 0.5, 0.9, 1.0 - 1e-4] {
            let x = nc.inverse_cdf(p).unwrap();
            assert_abs_diff_eq!(nc.cdf(x), p, epsilon = 1e-8);
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(NonCentralChiSquared::new(0.0, 1.0).is_err());
        assert!(NonCentralChiSquared::new(1.0, -1.0).is_err());
    }
}
