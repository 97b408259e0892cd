//! Semi-analytic Heston engine for European options.
//!
//! The call price is `S e^{-qT} P₁ − K e^{-rT} P₂`, where the two
//! probabilities are Fourier inversions of the Heston characteristic
//! function. The "little trap" form of the characteristic function is used,
//! which keeps the complex logarithm on its principal branch.

use num_complex::Complex64;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_math::integrals::{Integrator, SimpsonIntegral};
use ql_processes::HestonProcess;
use std::f64::consts::PI;
use std::sync::Arc;

/// Heston model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonParams {
    /// Initial variance.
    pub v0: Real,
    /// Mean-reversion speed.
    pub kappa: Real,
    /// Long-run variance.
    pub theta: Real,
    /// Volatility of variance.
    pub sigma: Real,
    /// Spot/variance correlation.
    pub rho: Real,
}

impl HestonParams {
    /// Parameters of `process`.
    pub fn from_process(process: &HestonProcess) -> Self {
        Self {
            v0: process.v0(),
            kappa: process.kappa(),
            theta: process.theta(),
            sigma: process.sigma(),
            rho: process.rho(),
        }
    }
}

const CHUNK: Real = 25.0;
const MAX_CHUNKS: usize = 40;

/// `Re[exp(iφx + C + D v₀) / (iφ)]` for probability `P_j`, `j ∈ {1, 2}`.
fn integrand(j: usize, phi: Real, x: Real, t: Time, p: &HestonParams) -> Real {
    let i = Complex64::i();
    let (u, b) = if j == 1 {
        (0.5, p.kappa - p.rho * p.sigma)
    } else {
        (-0.5, p.kappa)
    };
    let sigma2 = p.sigma * p.sigma;
    let beta = Complex64::new(b, -p.rho * p.sigma * phi);
    let d = (beta * beta - sigma2 * (2.0 * u * i * phi - phi * phi)).sqrt();
    let d = if d.re < 0.0 { -d } else { d };
    let g = (beta - d) / (beta + d);
    let edt = (-d * t).exp();

    let c = p.kappa * p.theta / sigma2
        * ((beta - d) * t - 2.0 * ((1.0 - g * edt) / (1.0 - g)).ln());
    let dd = (beta - d) / sigma2 * (1.0 - edt) / (1.0 - g * edt);
    let f = (i * phi * x + c + dd * p.v0).exp();
    (f / (i * phi)).re
}

fn probability(j: usize, x: Real, t: Time, p: &HestonParams) -> Result<Real> {
    let simpson = SimpsonIntegral::new(1e-10, 24);
    let mut total = 0.0;
    for k in 0..MAX_CHUNKS {
        let a = if k == 0 { 1e-8 } else { k as Real * CHUNK };
        let part = simpson.integrate(|phi| integrand(j, phi, x, t, p), a, (k + 1) as Real * CHUNK)?;
        total += part;
        if part.abs() < 1e-12 {
            break;
        }
    }
    Ok(0.5 + total / PI)
}

/// Heston price and spot delta of a European option with continuous rates
/// `r` and `q`.
#[allow(clippy::too_many_arguments)]
pub fn heston_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    t: Time,
    params: &HestonParams,
) -> Result<(Real, Real)> {
    ensure!(spot > 0.0 && strike > 0.0, "spot and strike must be positive");
    ensure!(t > 0.0, "maturity must be positive, got {t}");
    ensure!(params.sigma > 0.0, "vol-of-vol must be positive");

    let x = (spot / strike).ln() + (r - q) * t;
    let p1 = probability(1, x, t, params)?;
    let p2 = probability(2, x, t, params)?;
    let (df_q, df_r) = ((-q * t).exp(), (-r * t).exp());
    let call = spot * df_q * p1 - strike * df_r * p2;
    Ok(match option_type {
        OptionType::Call => (call, df_q * p1),
        OptionType::Put => (call - spot * df_q + strike * df_r, df_q * (p1 - 1.0)),
    })
}

/// Semi-analytic engine for European options under Heston.
#[derive(Debug, Clone)]
pub struct AnalyticHestonEngine {
    process: Arc<HestonProcess>,
}

impl AnalyticHestonEngine {
    /// Engine on the given process.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self { process }
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticHestonEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            "not an European option"
        );
        ensure!(args.dividends.is_empty(), "cash dividends are not supported");
        let t = args.exercise.last_time();
        let (npv, delta) = heston_price(
            args.payoff.option_type(),
            self.process.s0(),
            args.payoff.strike(),
            self.process.risk_free_rate().zero_rate(t),
            self.process.dividend_yield().zero_rate(t),
            t,
            &HestonParams::from_process(&self.process),
        )?;
        Ok(PricingResults::from_npv(npv).with_delta(delta))
    }
}
