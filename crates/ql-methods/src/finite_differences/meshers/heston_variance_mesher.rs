//! Variance grid for the Heston model.
//!
//! Points are quantiles of the non-central χ² law of `v(t)`, taken at
//! `t_avg_steps` horizons up to maturity and bucket-averaged into `size`
//! nodes. `v0` is moved onto the nearest node so that the solution can be
//! read off without interpolating in variance.
//!
//! Corresponds to `QuantLib::FdmHestonVarianceMesher`.

use super::{mesher_1d_newtype, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_processes::HestonProcess;
use tracing::{debug, warn};

/// Variance mesher for a Heston process.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmHestonVarianceMesher(Fdm1dMesher, Real);

impl FdmHestonVarianceMesher {
    /// `size` variance nodes for a problem of the given maturity.
    pub fn new(
        size: Size,
        process: &HestonProcess,
        maturity: Time,
        t_avg_steps: Size,
        eps: Real,
    ) -> Result<Self> {
        ensure!(size >= 2, "a variance mesher needs at least two points");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(t_avg_steps > 0, "at least one averaging step is required");

        let (mut v_grid, mut p_grid) = quantile_grid(size, process, maturity, t_avg_steps, eps)
            .unwrap_or_else(|e| {
                warn!(error = %e, "variance quantiles failed, using a uniform grid");
                fallback_grid(size, process)
            });

        p_grid.sort_by(Real::total_cmp);
        let vola_estimate = vola_estimate(process, &v_grid, &p_grid);

        let v0 = process.v0();
        for i in 1..size {
            if v_grid[i - 1] <= v0 && v_grid[i] >= v0 {
                if (v_grid[i - 1] - v0).abs() < (v_grid[i] - v0).abs() {
                    v_grid[i - 1] = v0;
                } else {
                    v_grid[i] = v0;
                }
            }
        }
        debug!(
            v_min = v_grid[0],
            v_max = v_grid[size - 1],
            size,
            vola_estimate,
            "Heston variance mesher"
        );
        Ok(Self(Fdm1dMesher::from_locations(v_grid)?, vola_estimate))
    }

    /// Volatility level used to size a matching log-spot grid.
    pub fn vola_estimate(&self) -> Real {
        self.1
    }
}

/// `∫ √v(p) dp` over the averaged quantiles, with `v(p)` linear between
/// nodes, widened for vol-of-vol dominated parameters.
fn vola_estimate(process: &HestonProcess, v_grid: &[Real], p_grid: &[Real]) -> Real {
    let skew_hint = if process.kappa() != 0.0 {
        (process.sigma() / process.kappa()).max(1.0)
    } else {
        1.0
    };
    let integral: Real = v_grid
        .windows(2)
        .zip(p_grid.windows(2))
        .map(|(v, p)| {
            let (v0, v1) = (v[0].max(0.0), v[1].max(0.0));
            let mean_sqrt = if (v1 - v0).abs() > Real::EPSILON * v1.max(1.0) {
                2.0 / 3.0 * (v1.powf(1.5) - v0.powf(1.5)) / (v1 - v0)
            } else {
                v0.sqrt()
            };
            (p[1] - p[0]) * mean_sqrt
        })
        .sum();
    integral * skew_hint.powf(1.5)
}

mesher_1d_newtype!(FdmHestonVarianceMesher);

fn quantile_grid(
    size: Size,
    process: &HestonProcess,
    maturity: Time,
    t_avg_steps: Size,
    eps: Real,
) -> Result<(Vec<Real>, Vec<Real>)> {
    let v0 = process.v0();
    // (variance, cumulative probability) pairs
    let mut grid: Vec<(Real, Real)> = Vec::with_capacity(size * t_avg_steps);
    for l in 1..=t_avg_steps {
        let t = maturity * l as Real / t_avg_steps as Real;
        let (k, dist) = process.variance_distribution(t)?;

        let q_min = 0.0;
        let q_max = v0.max(k * dist.inverse_cdf(1.0 - eps)?);
        let min_v_step = (q_max - q_min) / (50 * size) as Real;

        let mut p = 0.0;
        let mut v_tmp = q_min;
        grid.push((q_min, eps));
        for i in 1..size {
            p += (1.0 - eps - p) / (size - i) as Real;
            let vx = (v_tmp + min_v_step).max(k * dist.inverse_cdf(p)?);
            p = dist.cdf(vx / k);
            v_tmp = vx;
            grid.push((vx, p));
        }
    }
    grid.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let n = grid.len();
    let (v_grid, p_grid): (Vec<Real>, Vec<Real>) = (0..size)
        .map(|i| {
            let (b, e) = (i * n / size, (i + 1) * n / size);
            let bucket = &grid[b..e];
            let w = (e - b) as Real;
            (
                bucket.iter().map(|x| x.0).sum::<Real>() / w,
                bucket.iter().map(|x| x.1).sum::<Real>() / w,
            )
        })
        .unzip();
    ensure!(
        v_grid.windows(2).all(|w| w[0] < w[1]),
        "averaged variance quantiles are not strictly increasing"
    );
    Ok((v_grid, p_grid))
}

fn fallback_grid(size: Size, process: &HestonProcess) -> (Vec<Real>, Vec<Real>) {
    let vol = process.sigma() * (process.theta() / (2.0 * process.kappa())).sqrt();
    let mean = process.theta();
    let v0 = process.v0();
    let upper = (v0 + 4.0 * vol).max(mean + 4.0 * vol);
    let lower = (v0 - 4.0 * vol).min(mean - 4.0 * vol).max(0.0);
    (0..size)
        .map(|i| {
            let x = i as Real / (size - 1) as Real;
            (lower + x * (upper - lower), x)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_termstructures::FlatForward;
    use std::sync::Arc;

    fn process(v0: Real) -> HestonProcess {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            100.0,
            v0,
            1.0,
            0.04,
            0.3,
            -0.7,
        )
        .unwrap()
    }

    #[test]
    fn v0_is_a_grid_node() {
        let m = FdmHestonVarianceMesher::new(25, &process(0.04), 1.0, 10, 1e-4).unwrap();
        let v = m.locations();
        assert_eq!(v.len(), 25);
        assert_eq!(v[0], 0.0);
        assert!(v.iter().any(|&x| x == 0.04));
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn grid_reaches_into_the_right_tail() {
        let m = FdmHestonVarianceMesher::new(25, &process(0.04), 1.0, 10, 1e-4).unwrap();
        assert!(m.locations()[24] > 0.12);
    }

    #[test]
    fn vola_estimate_tracks_the_mean_variance() {
        // E[√v] sits below √E[v] = 0.2 by Jensen
        let m = FdmHestonVarianceMesher::new(51, &process(0.04), 1.0, 5, 1e-4).unwrap();
        assert!(m.vola_estimate() > 0.15 && m.vola_estimate() < 0.2);
        let high = FdmHestonVarianceMesher::new(51, &process(0.16), 1.0, 5, 1e-4).unwrap();
        assert!(high.vola_estimate() > m.vola_estimate());
        assert!(high.vola_estimate() < 0.4);
    }

    #[test]
    fn vola_estimate_of_a_constant_variance_is_its_root() {
        let v = [0.09; 5];
        let p = [0.0, 0.25, 0.5, 0.75, 1.0];
        assert!((vola_estimate(&process(0.04), &v, &p) - 0.3).abs() < 1e-14);
    }

    #[test]
    fn vola_estimate_integrates_the_root_exactly_on_a_segment() {
        // ∫₀¹ √(0.16 p) dp = 0.4 · 2/3
        let v = [0.0, 0.16];
        let p = [0.0, 1.0];
        assert!((vola_estimate(&process(0.04), &v, &p) - 0.4 * 2.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn fallback_grid_spans_four_stationary_deviations() {
        let p = process(0.09);
        let (grid, probabilities) = fallback_grid(11, &p);
        let vol = 0.3 * (0.04 / 2.0_f64).sqrt();
        assert_eq!(grid[0], 0.0);
        assert!((grid[10] - (0.09 + 4.0 * vol)).abs() < 1e-14);
        assert_eq!(probabilities[0], 0.0);
        assert_eq!(probabilities[10], 1.0);
    }
}
