//! `BlackVolTermStructure` — Black-volatility term structures.
//!
//! Provides the `BlackVolTermStructure` trait and `BlackConstantVol`, a flat
//! Black volatility surface.

use crate::term_structure::TermStructure;
use ql_core::{ensure, ensure_post, errors::Result, Real, Time, Volatility};

/// A Black-volatility term structure `σ(t, K)`.
///
/// Implementors must provide **exactly one** of:
/// * [`black_vol_impl`](BlackVolTermStructure::black_vol_impl) — σ(t, k)
/// * [`black_variance_impl`](BlackVolTermStructure::black_variance_impl) — σ²·t
///
/// The other is derived.
pub trait BlackVolTermStructure: TermStructure {
    /// Black volatility for time `t` and `strike`.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            // variance vanishes at t = 0; use the short-end slope instead
            let dt = 1e-5;
            return (self.black_variance_impl(dt, strike) / dt).sqrt();
        }
        (self.black_variance_impl(t, strike) / t).sqrt()
    }

    /// Black variance `σ²·t` for time `t` and `strike`.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol_impl(t, strike);
        vol * vol * t
    }

    /// The volatility if the surface is flat in time and strike.
    fn flat_volatility(&self) -> Option<Volatility> {
        None
    }

    /// Black volatility for a time and strike.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        self.black_vol_impl(t, strike)
    }

    /// Black variance for a time and strike.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        self.black_variance_impl(t, strike)
    }

    /// Variance accumulated between `t1` and `t2`.
    fn black_forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Result<Real> {
        ensure!(t1 <= t2, "{t1} later than {t2}");
        self.check_range(t2)?;
        let v1 = self.black_variance_impl(t1, strike);
        let v2 = self.black_variance_impl(t2, strike);
        ensure_post!(v2 >= v1, "variances must be non-decreasing ({v1} > {v2})");
        Ok(v2 - v1)
    }

    /// Volatility implied by the forward variance between `t1` and `t2`.
    fn black_forward_vol(&self, t1: Time, t2: Time, strike: Real) -> Result<Volatility> {
        if t1 == t2 {
            return Ok(self.black_vol_impl(t1, strike));
        }
        Ok((self.black_forward_variance(t1, t2, strike)? / (t2 - t1)).sqrt())
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// A flat (constant) Black volatility surface.
///
/// `σ(t, K) = constant` for all `t > 0` and all strikes `K`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Constant Black vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl TermStructure for BlackConstantVol {}

impl BlackVolTermStructure for BlackConstantVol {
    fn flat_volatility(&self) -> Option<Volatility> {
        Some(self.volatility)
    }

    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }

    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        self.volatility * self.volatility * t
    }
}
