//! The `PricingEngine` trait and the results it produces.

use ql_core::{errors::Result, Real};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Greeks are `None` when the engine does not provide them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// ∂V/∂S.
    pub delta: Option<Real>,
    /// ∂²V/∂S².
    pub gamma: Option<Real>,
    /// ∂V/∂t.
    pub theta: Option<Real>,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Results carrying just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            ..Self::default()
        }
    }

    /// Set delta.
    pub fn with_delta(mut self, delta: Real) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Set gamma.
    pub fn with_gamma(mut self, gamma: Real) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Set theta.
    pub fn with_theta(mut self, theta: Real) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }
}

/// A pricing engine computes `PricingResults` for one kind of instrument,
/// described by its argument struct `Args`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_delta(0.55)
            .with_gamma(0.02)
            .with_result("vega", 0.3);
        assert_abs_diff_eq!(r.npv, 42.0);
        assert_eq!(r.delta, Some(0.55));
        assert_eq!(r.gamma, Some(0.02));
        assert_eq!(r.theta, None);
        assert_abs_diff_eq!(r.additional_results["vega"], 0.3);
    }
}
