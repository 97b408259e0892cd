//! `InterpolatedZeroCurve` — a yield curve from zero-rate pillars.
//!
//! Zero rates are interpolated linearly in time; before the first pillar the
//! first rate applies, after the last one the curve extrapolates the last
//! segment's instantaneous forward.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{ensure, errors::Result, Rate, Real, Time};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};

/// A yield curve defined by continuously-compounded zero rates at pillar
/// times.
#[derive(Debug, Clone)]
pub struct InterpolatedZeroCurve {
    times: Vec<Time>,
    rates: Vec<Rate>,
    interpolation: LinearInterpolation,
}

impl InterpolatedZeroCurve {
    /// Curve through `(times[i], rates[i])`; at least two pillars with
    /// strictly increasing, positive times.
    pub fn new(times: &[Time], rates: &[Rate]) -> Result<Self> {
        ensure!(
            times.first().map_or(false, |&t| t > 0.0),
            "first pillar time must be positive"
        );
        let interpolation = LinearInterpolation::new(times, rates)?;
        Ok(Self {
            times: times.to_vec(),
            rates: rates.to_vec(),
            interpolation,
        })
    }

    /// Pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Zero rates at the pillars.
    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }
}

impl TermStructure for InterpolatedZeroCurve {
    fn max_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }
}

impl YieldTermStructure for InterpolatedZeroCurve {
    fn zero_rate_impl(&self, t: Time) -> Rate {
        let first = self.times[0];
        let last = self.max_time();
        if t <= first {
            return self.rates[0];
        }
        if t <= last {
            return self.interpolation.value(t);
        }
        // flat instantaneous forward beyond the last pillar
        let z_last = self.rates[self.rates.len() - 1];
        let inst_fwd: Real = z_last + last * self.interpolation.derivative(last);
        (z_last * last + inst_fwd * (t - last)) / t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn interpolates_zero_rates_linearly() {
        let curve = InterpolatedZeroCurve::new(&[1.0, 2.0], &[0.02, 0.04]).unwrap();
        assert_abs_diff_eq!(curve.zero_rate(0.5), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.zero_rate(1.5), 0.03, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.discount(1.5), (-0.045_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn forward_rate_matches_discount_ratio() {
        let curve = InterpolatedZeroCurve::new(&[1.0, 2.0], &[0.02, 0.04]).unwrap();
        // P(1) = e^{-0.02}, P(2) = e^{-0.08}
        assert_abs_diff_eq!(curve.forward_rate(1.0, 2.0), 0.06, epsilon = 1e-12);
    }

    #[test]
    fn extrapolates_with_flat_forward() {
        let curve = InterpolatedZeroCurve::new(&[1.0, 2.0], &[0.02, 0.04]).unwrap();
        // instantaneous forward at 2: d(z t)/dt = z + t z' = 0.04 + 2 * 0.02
        assert_abs_diff_eq!(curve.forward_rate(3.0, 4.0), 0.08, epsilon = 1e-12);
    }

    #[test]
    fn rejects_invalid_pillars() {
        assert!(InterpolatedZeroCurve::new(&[0.0, 1.0], &[0.01, 0.02]).is_err());
        assert!(InterpolatedZeroCurve::new(&[1.0], &[0.01]).is_err());
    }

    proptest! {
        #[test]
        fn forwards_reproduce_the_zero_curve(
            z1 in -0.01f64..0.1,
            z2 in -0.01f64..0.1,
            t in 0.1f64..10.0,
            dt in 0.01f64..5.0,
        ) {
            let curve = InterpolatedZeroCurve::new(&[1.0, 5.0], &[z1, z2]).unwrap();
            let t2 = t + dt;
            let (zt, zt2) = (curve.zero_rate(t), curve.zero_rate(t2));
            prop_assert!((curve.discount(t) - (-zt * t).exp()).abs() < 1e-12);
            let forward = curve.forward_rate(t, t2);
            prop_assert!((forward * dt - (zt2 * t2 - zt * t)).abs() < 1e-10);
        }
    }
}
