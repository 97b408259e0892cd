//! Hull-White short-rate process fitted to a yield curve.
//!
//! ```text
//! r(t) = x(t) + φ(t)
//! dx   = −a x dt + σ dW
//! φ(t) = f(0, t) + ½ (σ (1 − e^{−at}) / a)²
//! ```
//!
//! Corresponds to `QuantLib::HullWhiteProcess`.

use crate::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time, QL_EPSILON};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Bump used for the slope of the instantaneous forward curve.
const FORWARD_SHIFT: Time = 1e-4;

/// Hull-White process with mean reversion `a` and volatility `sigma`.
#[derive(Debug, Clone)]
pub struct HullWhiteProcess {
    term_structure: Arc<dyn YieldTermStructure>,
    a: Real,
    sigma: Real,
}

impl HullWhiteProcess {
    /// Process fitted to `term_structure`.
    pub fn new(term_structure: Arc<dyn YieldTermStructure>, a: Real, sigma: Real) -> Result<Self> {
        ensure!(a >= 0.0, "negative mean reversion ({a}) given");
        ensure!(sigma >= 0.0, "negative volatility ({sigma}) given");
        Ok(Self {
            term_structure,
            a,
            sigma,
        })
    }

    /// Mean-reversion speed.
    pub fn a(&self) -> Real {
        self.a
    }

    /// Short-rate volatility.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// The fitted yield curve.
    pub fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.term_structure
    }

    /// Deterministic shift `φ(t)` reproducing today's curve.
    pub fn phi(&self, t: Time) -> Real {
        let forward = self.term_structure.forward_rate(t, t);
        let tmp = if self.a < QL_EPSILON.sqrt() {
            self.sigma * t
        } else {
            self.sigma * (1.0 - (-self.a * t).exp()) / self.a
        };
        forward + 0.5 * tmp * tmp
    }

    /// Short rate `x + φ(t)` for the state variable `x`.
    pub fn short_rate(&self, t: Time, x: Real) -> Real {
        x + self.phi(t)
    }
}

impl StochasticProcess1D for HullWhiteProcess {
    fn x0(&self) -> Real {
        self.term_structure.forward_rate(0.0, 0.0)
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let f = self.term_structure.forward_rate(t, t);
        let f_up = self.term_structure.forward_rate(t + FORWARD_SHIFT, t + FORWARD_SHIFT);
        let f_prime = (f_up - f) / FORWARD_SHIFT;
        let alpha_drift = if self.a < QL_EPSILON.sqrt() {
            self.sigma * self.sigma * t
        } else {
            self.sigma * self.sigma / (2.0 * self.a) * (1.0 - (-2.0 * self.a * t).exp())
        };
        -self.a * x + alpha_drift + self.a * f + f_prime
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.sigma
    }
}
