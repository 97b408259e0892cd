//! Generalized Black-Scholes process.
//!
//! `dS = (r(t) − q(t)) S dt + σ(t, S) S dW`
//!
//! where `r` is the risk-free rate, `q` the continuous dividend yield and `σ`
//! the local volatility implied by the Black surface (or supplied
//! explicitly).

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{Real, Time, Volatility};
use ql_termstructures::{
    BlackVolTermStructure, FlatForward, LocalConstantVol, LocalVolSurface,
    LocalVolTermStructure, YieldTermStructure,
};
use std::sync::Arc;

/// A generalized Black-Scholes stochastic process.
#[derive(Debug, Clone)]
pub struct GeneralizedBlackScholesProcess {
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
}

impl GeneralizedBlackScholesProcess {
    /// Process with spot `x0` and the given curves.
    pub fn new(
        x0: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self {
            x0,
            risk_free_rate,
            dividend_yield,
            black_vol,
            local_vol: None,
        }
    }

    /// Use `local_vol` instead of the local volatility implied by the Black
    /// surface.
    pub fn with_local_vol(mut self, local_vol: Arc<dyn LocalVolTermStructure>) -> Self {
        self.local_vol = Some(local_vol);
        self
    }

    /// The spot price.
    pub fn spot(&self) -> Real {
        self.x0
    }

    /// The risk-free rate term structure.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// The dividend yield term structure.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// The Black volatility surface.
    pub fn black_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.black_vol
    }

    /// The local volatility surface.
    ///
    /// Unless one was supplied, a flat Black surface gives the same flat
    /// local vol and any other surface is converted with Dupire's formula.
    pub fn local_volatility(&self) -> Arc<dyn LocalVolTermStructure> {
        if let Some(lv) = &self.local_vol {
            return Arc::clone(lv);
        }
        match self.black_vol.flat_volatility() {
            Some(vol) => Arc::new(LocalConstantVol::new(vol)),
            None => Arc::new(LocalVolSurface::new(
                Arc::clone(&self.black_vol),
                Arc::clone(&self.risk_free_rate),
                Arc::clone(&self.dividend_yield),
                self.x0,
            )),
        }
    }

    /// Forward price for delivery at `t`.
    pub fn forward(&self, t: Time) -> Real {
        self.x0 * self.dividend_yield.discount(t) / self.risk_free_rate.discount(t)
    }

    fn vol(&self, t: Time, x: Real) -> Volatility {
        match &self.local_vol {
            // outside the local surface's domain the Black vol is used
            Some(lv) => lv
                .local_vol(t, x)
                .unwrap_or_else(|_| self.black_vol.black_vol(t, x)),
            None => self.black_vol.black_vol(t, x),
        }
    }

    fn carry(&self, t1: Time, t2: Time) -> Real {
        self.risk_free_rate.forward_rate(t1, t2) - self.dividend_yield.forward_rate(t1, t2)
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        self.carry(t, t) * x
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.vol(t, x) * x
    }

    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x * (self.carry(t, t + dt) * dt).exp()
    }

    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        // exact in log space for σ frozen over [t, t + dt]
        let sigma = self.vol(t, x);
        x * ((self.carry(t, t + dt) - 0.5 * sigma * sigma) * dt + sigma * dt.sqrt() * dw).exp()
    }
}

// ── Special cases ─────────────────────────────────────────────────────────────

/// A Black-Scholes process with no dividends (`q = 0`).
pub fn black_scholes_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(
        x0,
        risk_free_rate,
        Arc::new(FlatForward::new(0.0)),
        black_vol,
    )
}

/// A Black-Scholes-Merton process with continuous dividend yield.
pub fn black_scholes_merton_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, dividend_yield, black_vol)
}
