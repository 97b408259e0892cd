//! Standard normal distribution.

use ql_core::{ensure, errors::Result, Real};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

/// Density `φ(x) = exp(-x²/2) / √(2π)`.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Cumulative distribution `Φ(x)`.
///
/// Evaluated as `½ erfc(-x/√2)`, which keeps full relative accuracy deep in
/// the lower tail.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Quantile `Φ⁻¹(p)` for `p ∈ (0, 1)`.
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    ensure!(p > 0.0 && p < 1.0, "probability {p} outside (0, 1)");
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(normal_cdf(1.96), 0.975_002_104_851_78, epsilon = 1e-12);
        assert_abs_diff_eq!(normal_cdf(-3.0), 0.001_349_898_031_630_09, epsilon = 1e-14);
        assert_abs_diff_eq!(normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
    }

    #[test]
    fn quantile_of_tail_probability() {
        assert_abs_diff_eq!(
            normal_cdf_inverse(1.0 - 1e-4).unwrap(),
            3.719_016_485_455_68,
            epsilon = 1e-9
        );
        assert!(normal_cdf_inverse(0.0).is_err());
        assert!(normal_cdf_inverse(1.0).is_err());
    }

    proptest! {
        #[test]
        fn quantile_inverts_cdf(x in -6.0f64..6.0) {
            let p = normal_cdf(x);
            let y = normal_cdf_inverse(p).unwrap();
            prop_assert!((x - y).abs() < 1e-8);
        }
    }
}
