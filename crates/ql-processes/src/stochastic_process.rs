//! One-factor diffusion interface.

use ql_core::{Real, Time};

/// A diffusion `dX = μ(t, X) dt + σ(t, X) dW`.
///
/// Only the drift and diffusion are required; the discretisation defaults
/// are a first-order Euler scheme which implementors may replace by exact
/// moments.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Value of the process today.
    fn x0(&self) -> Real;

    /// μ(t, x).
    fn drift(&self, t: Time, x: Real) -> Real;

    /// σ(t, x).
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// `E[X(t + dt) | X(t) = x]`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Standard deviation of `X(t + dt)` given `X(t) = x`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion(t, x) * dt.sqrt()
    }

    /// Move `x` from `t` to `t + dt` for the standard normal draw `dw`.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw
    }
}
