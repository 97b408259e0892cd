//! Black-Scholes-Merton closed form for European options.
//!
//! Kept as the reference the finite-difference engines are measured against.

use ql_core::{ensure, errors::Result, Real, Time, Volatility};
use ql_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_math::{normal_cdf, normal_pdf};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Price and sensitivities of a European option under Black-Scholes-Merton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Present value.
    pub npv: Real,
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ.
    pub vega: Real,
    /// ∂V/∂t, per year.
    pub theta: Real,
    /// ∂V/∂r.
    pub rho: Real,
}

/// Black-Scholes-Merton price and greeks with continuous rates `r`, `q`.
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
///
/// At zero variance the option is worth its discounted forward intrinsic
/// value.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    volatility: Volatility,
    t: Time,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let std_dev = volatility * t.sqrt();

    if std_dev <= 1e-15 {
        let fwd_intrinsic = phi * (spot * df_q - strike * df_r);
        let itm = fwd_intrinsic > 0.0;
        return BlackScholesGreeks {
            npv: fwd_intrinsic.max(0.0),
            delta: if itm { phi * df_q } else { 0.0 },
            gamma: 0.0,
            vega: 0.0,
            theta: if itm { phi * (q * spot * df_q - r * strike * df_r) } else { 0.0 },
            rho: if itm { phi * strike * t * df_r } else { 0.0 },
        };
    }

    let d1 = ((spot / strike).ln() + (r - q) * t) / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let pdf = normal_pdf(d1);

    BlackScholesGreeks {
        npv: phi * (spot * df_q * nd1 - strike * df_r * nd2),
        delta: phi * df_q * nd1,
        gamma: df_q * pdf / (spot * std_dev),
        vega: spot * df_q * pdf * t.sqrt(),
        theta: -spot * df_q * pdf * volatility / (2.0 * t.sqrt())
            + phi * (q * spot * df_q * nd1 - r * strike * df_r * nd2),
        rho: phi * strike * t * df_r * nd2,
    }
}

/// Closed-form engine for European vanilla options.
#[derive(Debug, Clone)]
pub struct AnalyticEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticEuropeanEngine {
    /// Engine on the given process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            "not an European option"
        );
        ensure!(
            args.dividends.is_empty(),
            "cash dividends are not supported by the analytic engine"
        );
        let t = args.exercise.last_time();
        let strike = args.payoff.strike();
        let r = self.process.risk_free_rate().zero_rate(t);
        let q = self.process.dividend_yield().zero_rate(t);
        let vol = self.process.black_volatility().black_vol(t, strike);

        let g = black_scholes_merton(
            args.payoff.option_type(),
            self.process.spot(),
            strike,
            r,
            q,
            vol,
            t,
        );
        Ok(PricingResults::from_npv(g.npv)
            .with_delta(g.delta)
            .with_gamma(g.gamma)
            .with_theta(g.theta)
            .with_result("vega", g.vega)
            .with_result("rho", g.rho))
    }
}
