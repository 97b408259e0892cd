//! Log-spot grid for Black-Scholes type problems.
//!
//! The grid covers the forward path of the spot, including the drops caused
//! by cash dividends, widened on both sides by
//! `σ√T·Φ⁻¹(1−eps)·scale_factor` in log space.

use super::{mesher_1d_newtype, Concentrating1dMesher, Fdm1dMesher, Uniform1dMesher};
use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_instruments::Dividend;
use ql_math::normal_cdf_inverse;
use ql_processes::GeneralizedBlackScholesProcess;
use tracing::debug;

/// Optional inputs of [`FdmBlackScholesMesher`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlackScholesMesherParams {
    /// Lower log-spot bound overriding the computed one.
    pub x_min: Option<Real>,
    /// Upper log-spot bound overriding the computed one.
    pub x_max: Option<Real>,
    /// Tail probability cut off on each side.
    pub eps: Real,
    /// Extra widening of the σ√T band.
    pub scale_factor: Real,
    /// Spot level and density around which points are concentrated.
    pub c_point: Option<(Real, Real)>,
    /// Cash dividends paid before maturity.
    pub dividends: Vec<Dividend>,
}

impl Default for BlackScholesMesherParams {
    fn default() -> Self {
        Self {
            x_min: None,
            x_max: None,
            eps: 1e-4,
            scale_factor: 1.5,
            c_point: None,
            dividends: Vec::new(),
        }
    }
}

impl BlackScholesMesherParams {
    /// Concentrate points around spot level `s` with the given density.
    pub fn with_c_point(mut self, s: Real, density: Real) -> Self {
        self.c_point = Some((s, density));
        self
    }

    /// Fix the log-spot bounds.
    pub fn with_bounds(mut self, x_min: Option<Real>, x_max: Option<Real>) -> Self {
        self.x_min = x_min;
        self.x_max = x_max;
        self
    }

    /// Account for cash dividends.
    pub fn with_dividends(mut self, dividends: Vec<Dividend>) -> Self {
        self.dividends = dividends;
        self
    }
}

/// Log-spot mesher for a Black-Scholes process.
///
/// Corresponds to `QuantLib::FdmBlackScholesMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmBlackScholesMesher(Fdm1dMesher);

impl FdmBlackScholesMesher {
    /// `size` points for an option on `process` with the given maturity
    /// and strike.
    pub fn new(
        size: Size,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
        params: &BlackScholesMesherParams,
    ) -> Result<Self> {
        let spot = process.spot();
        ensure!(spot > 0.0, "negative or null underlying given");
        ensure!(maturity >= 0.0, "negative maturity ({maturity})");

        let mut steps: Vec<(Time, Real)> = params
            .dividends
            .iter()
            .filter(|d| d.time >= 0.0 && d.time <= maturity)
            .map(|d| (d.time, d.amount))
            .collect();
        let path_steps = ((24.0 * maturity) as Size).max(2);
        steps.extend((0..path_steps).map(|i| ((i + 1) as Real * maturity / path_steps as Real, 0.0)));
        steps.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let r = process.risk_free_rate();
        let q = process.dividend_yield();
        let mut last_time = 0.0;
        let mut fwd = spot;
        let (mut lo, mut hi) = (fwd, fwd);
        for &(t, amount) in &steps {
            fwd *= r.discount(last_time) / r.discount(t) * q.discount(t) / q.discount(last_time);
            lo = lo.min(fwd);
            hi = hi.max(fwd);
            fwd -= amount;
            lo = lo.min(fwd);
            hi = hi.max(fwd);
            last_time = t;
        }
        ensure!(lo > 0.0, "dividends exceed the forward of the underlying");

        let norm_inv_eps = normal_cdf_inverse(1.0 - params.eps)?;
        let sigma_sqrt_t = process.black_volatility().black_vol(maturity, strike) * maturity.sqrt();
        let x_min = params
            .x_min
            .unwrap_or(lo.ln() - sigma_sqrt_t * norm_inv_eps * params.scale_factor);
        let x_max = params
            .x_max
            .unwrap_or(hi.ln() + sigma_sqrt_t * norm_inv_eps * params.scale_factor);
        debug!(x_min, x_max, size, "Black-Scholes mesher bounds");

        let helper: Fdm1dMesher = match params.c_point {
            Some((c, density)) if c > 0.0 && c.ln() >= x_min && c.ln() <= x_max => {
                Concentrating1dMesher::new(x_min, x_max, size, Some((c.ln(), density)), false)?
                    .into()
            }
            _ => Uniform1dMesher::new(x_min, x_max, size)?.into(),
        };
        Ok(Self(helper))
    }
}

mesher_1d_newtype!(FdmBlackScholesMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_math::normal_cdf_inverse;
    use ql_processes::black_scholes_merton_process;
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    fn process(spot: Real) -> GeneralizedBlackScholesProcess {
        black_scholes_merton_process(
            spot,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(BlackConstantVol::new(0.2)),
        )
    }

    #[test]
    fn bounds_cover_the_forward_band() {
        let m = FdmBlackScholesMesher::new(
            100,
            &process(100.0),
            1.0,
            100.0,
            &BlackScholesMesherParams::default(),
        )
        .unwrap();
        let width = 0.2 * normal_cdf_inverse(1.0 - 1e-4).unwrap() * 1.5;
        let x = m.locations();
        assert_abs_diff_eq!(x[0], 100.0_f64.ln() - width, epsilon = 1e-12);
        assert_abs_diff_eq!(x[99], (100.0 * 0.05_f64.exp()).ln() + width, epsilon = 1e-10);
    }

    #[test]
    fn dividends_widen_the_grid_downwards() {
        let base = FdmBlackScholesMesher::new(50, &process(100.0), 1.0, 100.0, &Default::default())
            .unwrap();
        let params = BlackScholesMesherParams::default().with_dividends(vec![Dividend::new(0.5, 20.0)]);
        let div = FdmBlackScholesMesher::new(50, &process(100.0), 1.0, 100.0, &params).unwrap();
        assert!(div.locations()[0] < base.locations()[0]);
    }

    #[test]
    fn explicit_bounds_win() {
        let params = BlackScholesMesherParams::default()
            .with_bounds(Some(3.0), Some(6.0))
            .with_c_point(100.0, 0.1);
        let m = FdmBlackScholesMesher::new(30, &process(100.0), 1.0, 100.0, &params).unwrap();
        assert_eq!(m.locations()[0], 3.0);
        assert_eq!(m.locations()[29], 6.0);
    }
}
