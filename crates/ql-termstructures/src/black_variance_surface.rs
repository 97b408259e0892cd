//! `BlackVarianceSurface` — a Black-variance surface interpolated from a
//! grid of (expiry × strike) implied volatilities.
//!
//! Interpolation is bilinear in **total variance** (`σ²·t`). Strikes outside
//! the grid use the nearest strike; times before the first expiry scale the
//! first variance linearly to zero and times after the last expiry keep the
//! last volatility.

use crate::black_vol_term_structure::BlackVolTermStructure;
use crate::term_structure::TermStructure;
use ql_core::{ensure, errors::Result, Real, Time, Volatility};
use ql_math::interpolations::{BilinearInterpolation, Interpolation2D};

/// A Black-variance surface built from a grid of implied volatilities.
#[derive(Debug, Clone)]
pub struct BlackVarianceSurface {
    times: Vec<Time>,
    strikes: Vec<Real>,
    variances: BilinearInterpolation,
}

impl BlackVarianceSurface {
    /// Surface from `vols[i][j]`, the implied vol for expiry `times[i]` and
    /// strike `strikes[j]`.
    pub fn new(times: &[Time], strikes: &[Real], vols: &[Vec<Volatility>]) -> Result<Self> {
        ensure!(times.len() >= 2, "need at least 2 expiries");
        ensure!(strikes.len() >= 2, "need at least 2 strikes");
        ensure!(times[0] > 0.0, "first expiry must be positive");
        ensure!(
            vols.len() == times.len(),
            "vols rows ({}) must match expiries ({})",
            vols.len(),
            times.len()
        );
        let mut grid = Vec::with_capacity(times.len() * strikes.len());
        for (i, (row, &t)) in vols.iter().zip(times).enumerate() {
            ensure!(
                row.len() == strikes.len(),
                "vols row {i} length ({}) must match strikes length ({})",
                row.len(),
                strikes.len()
            );
            grid.extend(row.iter().map(|&v| v * v * t));
        }
        for j in 0..strikes.len() {
            for i in 1..times.len() {
                let (prev, next) = (grid[(i - 1) * strikes.len() + j], grid[i * strikes.len() + j]);
                ensure!(
                    next >= prev,
                    "decreasing variance at strike {} between t = {} and t = {}",
                    strikes[j],
                    times[i - 1],
                    times[i]
                );
            }
        }
        let variances = BilinearInterpolation::new(strikes, times, &grid)?;
        Ok(Self {
            times: times.to_vec(),
            strikes: strikes.to_vec(),
            variances,
        })
    }

    fn variance_at(&self, t: Time, strike: Real) -> Real {
        let k = strike.clamp(self.strikes[0], self.strikes[self.strikes.len() - 1]);
        let first = self.times[0];
        let last = self.times[self.times.len() - 1];
        if t <= first {
            self.variances.value(k, first) * t / first
        } else if t <= last {
            self.variances.value(k, t)
        } else {
            self.variances.value(k, last) * t / last
        }
    }
}

impl TermStructure for BlackVarianceSurface {
    fn max_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }
}

impl BlackVolTermStructure for BlackVarianceSurface {
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        self.variance_at(t.max(0.0), strike)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn surface() -> BlackVarianceSurface {
        BlackVarianceSurface::new(
            &[0.5, 1.0],
            &[90.0, 110.0],
            &[vec![0.25, 0.20], vec![0.24, 0.21]],
        )
        .unwrap()
    }

    #[test]
    fn reproduces_pillar_vols() {
        let s = surface();
        assert_abs_diff_eq!(s.black_vol(0.5, 90.0), 0.25, epsilon = 1e-14);
        assert_abs_diff_eq!(s.black_vol(1.0, 110.0), 0.21, epsilon = 1e-14);
    }

    #[test]
    fn interpolates_in_variance() {
        let s = surface();
        let v = 0.5 * (0.25 * 0.25 * 0.5 + 0.20 * 0.20 * 0.5);
        assert_abs_diff_eq!(s.black_variance(0.5, 100.0), v, epsilon = 1e-15);
        let w = 0.5 * (0.25 * 0.25 * 0.5 + 0.24 * 0.24);
        assert_abs_diff_eq!(s.black_variance(0.75, 90.0), w, epsilon = 1e-15);
    }

    #[test]
    fn extrapolates_flat_vol_in_time_and_strike() {
        let s = surface();
        assert_abs_diff_eq!(s.black_vol(0.1, 90.0), 0.25, epsilon = 1e-14);
        assert_abs_diff_eq!(s.black_vol(3.0, 110.0), 0.21, epsilon = 1e-14);
        assert_abs_diff_eq!(s.black_vol(1.0, 200.0), 0.21, epsilon = 1e-14);
    }

    #[test]
    fn rejects_calendar_arbitrage() {
        let r = BlackVarianceSurface::new(
            &[0.5, 1.0],
            &[90.0, 110.0],
            &[vec![0.40, 0.20], vec![0.20, 0.21]],
        );
        assert!(r.is_err());
    }
}
