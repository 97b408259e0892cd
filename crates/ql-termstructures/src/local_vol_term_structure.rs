//! `LocalVolTermStructure` — local-volatility term structures.
//!
//! Provides the `LocalVolTermStructure` trait and `LocalConstantVol`.

use crate::term_structure::TermStructure;
use ql_core::{errors::Result, Real, Time, Volatility};

/// A local-volatility term structure: `σ_local(t, S)`.
pub trait LocalVolTermStructure: TermStructure {
    /// Local volatility for time `t` and underlying level `underlying`.
    fn local_vol_impl(&self, t: Time, underlying: Real) -> Result<Volatility>;

    /// Local volatility for a time and underlying level.
    fn local_vol(&self, t: Time, underlying: Real) -> Result<Volatility> {
        self.check_range(t)?;
        self.local_vol_impl(t, underlying)
    }
}

// ── LocalConstantVol ──────────────────────────────────────────────────────────

/// A constant local volatility surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalConstantVol {
    volatility: Volatility,
}

impl LocalConstantVol {
    /// Constant local vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl TermStructure for LocalConstantVol {}

impl LocalVolTermStructure for LocalConstantVol {
    fn local_vol_impl(&self, _t: Time, _underlying: Real) -> Result<Volatility> {
        Ok(self.volatility)
    }
}
